/// Rule-line grammar parser using nom combinators
///
/// Grammar (fixed order, whitespace separated):
/// ```text
/// <action> <protocol> <source_ip> <source_port> <direction> <dest_ip> <dest_port> (<options>)
/// ```
/// Any deviation in field count, direction token or parenthesis placement
/// fails the whole line; no partial record is produced.
use super::options::parse_options;
use super::record::{PortInfo, RuleMetadata, RuleRecord};
use crate::error::{ConvertError, Result};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::space1,
    sequence::tuple,
    IResult,
};

/// Read-only configuration consumed by the parser. Passed in explicitly so
/// parsing stays a pure function of (line, config).
#[derive(Debug, Clone, Copy)]
pub struct ParseConfig {
    /// Populate `raw_rule` with the original line.
    pub include_raw: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self { include_raw: true }
    }
}

/// Parse one trimmed, non-empty, non-comment rule line into a record.
///
/// Example: `alert tcp $EXTERNAL_NET any -> $HOME_NET 445 (msg:"Test"; sid:1;)`
pub fn parse_rule(line: &str, config: &ParseConfig) -> Result<RuleRecord> {
    let (rest, (action, _, protocol, _, source_ip, _, source_port, _, direction, _, dest_ip, _, dest_port, _)) =
        tuple((
            word, space1, word, space1, field, space1, field, space1, direction_token, space1,
            field, space1, field, space1,
        ))(line)
        .map_err(|_: nom::Err<nom::error::Error<&str>>| invalid())?;

    // The remainder must be a single parenthesized, non-empty option block
    // with nothing after the closing parenthesis.
    let block = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .filter(|b| !b.is_empty())
        .ok_or_else(invalid)?;

    let options = parse_options(block);
    let parsed_ports = PortInfo::from_fields(source_port, dest_port);
    let metadata = RuleMetadata::from_options(&options);

    Ok(RuleRecord {
        action: action.to_string(),
        protocol: protocol.to_string(),
        source_ip: source_ip.to_string(),
        source_port: source_port.to_string(),
        direction: direction.to_string(),
        dest_ip: dest_ip.to_string(),
        dest_port: dest_port.to_string(),
        options,
        parsed_ports,
        metadata,
        raw_rule: config.include_raw.then(|| line.to_string()),
    })
}

fn invalid() -> ConvertError {
    ConvertError::RuleParse("invalid rule format".to_string())
}

/// Action and protocol tokens: one or more word characters.
fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

/// Address and port fields: any run of non-whitespace, copied verbatim
/// (variables, CIDR, negations and `[...]` lists all pass through).
fn field(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

/// Direction token. The bare `>` is accepted deliberately: the historical
/// matcher used `-?>` and rules relying on that looseness still parse.
fn direction_token(input: &str) -> IResult<&str, &str> {
    alt((tag("<->"), tag("<-"), tag("->"), tag(">")))(input)
}
