// Rule conversion core - Snort/Suricata rule-line parsing and enrichment
pub mod options;
pub mod parser;
pub mod record;

pub use options::{parse_options, split_options};
pub use parser::{parse_rule, ParseConfig};
pub use record::{OptionMap, OptionValue, PortInfo, RuleMetadata, RuleRecord};
