/// Conversion driver: line loop, NDJSON writing, run statistics
use crate::config::Settings;
use crate::error::Result;
use crate::rules::{parse_rule, ParseConfig};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Counters for one conversion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertStats {
    /// Rules successfully parsed and written.
    pub processed: u64,
    /// Lines that failed to parse or serialize.
    pub errors: u64,
    /// Records suppressed by the SID filter.
    pub filtered: u64,
}

impl std::fmt::Display for ConvertStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "processed={}, errors={}, filtered={}",
            self.processed, self.errors, self.filtered
        )
    }
}

/// Converts a stream of rule lines into NDJSON records.
pub struct Converter {
    settings: Settings,
}

impl Converter {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Run the conversion over an already-open reader/writer pair.
    ///
    /// Blank lines and `#` comments are skipped without being counted.
    /// Parse and serialization failures are logged, counted and skipped;
    /// I/O failures abort. Output order equals input order.
    pub fn convert<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<ConvertStats> {
        let parse_config = ParseConfig {
            include_raw: self.settings.include_raw,
        };
        let mut stats = ConvertStats::default();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let record = match parse_rule(line, &parse_config) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Error parsing rule {}: {}", stats.processed + 1, e);
                    stats.errors += 1;
                    continue;
                }
            };

            // Records without metadata carry no SID and pass the filter.
            if let Some(filter) = &self.settings.sid_filter {
                if let Some(sid) = record.sid() {
                    if sid.to_string() != *filter {
                        debug!("Filtered rule with sid {}", sid);
                        stats.filtered += 1;
                        continue;
                    }
                }
            }

            let json = if self.settings.pretty {
                serde_json::to_string_pretty(&record)
            } else {
                serde_json::to_string(&record)
            };

            match json {
                Ok(json) => {
                    writeln!(writer, "{}", json)?;
                    stats.processed += 1;
                }
                Err(e) => {
                    warn!("Error serializing rule to JSON: {}", e);
                    stats.errors += 1;
                }
            }
        }

        writer.flush()?;
        Ok(stats)
    }

    /// Convert a rules file, deriving the output name when none is given.
    /// Failure to open the input or create the output is fatal.
    pub fn convert_file(&self, input: &Path, output: Option<&Path>) -> Result<ConvertStats> {
        let derived;
        let output = match output {
            Some(path) => path,
            None => {
                derived = output_filename(input);
                derived.as_path()
            }
        };

        info!("Converting {} -> {}", input.display(), output.display());

        let reader = BufReader::new(File::open(input)?);
        let writer = BufWriter::new(File::create(output)?);

        self.convert(reader, writer)
    }
}

/// Derive the output filename: swap the input's extension for `.ndjson`, or
/// append it when the filename has none.
pub fn output_filename(input: &Path) -> PathBuf {
    let name = input.to_string_lossy();
    let last_dot = name.rfind('.');
    let last_sep = name.rfind(std::path::MAIN_SEPARATOR);

    match last_dot {
        Some(dot) if last_sep.map_or(true, |sep| dot > sep) => {
            PathBuf::from(format!("{}.ndjson", &name[..dot]))
        }
        _ => PathBuf::from(format!("{}.ndjson", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(input: &str, settings: Settings) -> (Vec<String>, ConvertStats) {
        let converter = Converter::new(settings);
        let mut out = Vec::new();
        let stats = converter
            .convert(Cursor::new(input), &mut out)
            .expect("conversion failed");
        let lines = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| l.to_string())
            .collect();
        (lines, stats)
    }

    #[test]
    fn test_convert_skips_comments_and_blanks() {
        let input = "\n# local rules\n\nalert tcp any any -> any 80 (sid:1;)\n";
        let (lines, stats) = run(input, Settings::default());

        assert_eq!(lines.len(), 1);
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.errors, 0);
    }

    #[test]
    fn test_convert_counts_malformed_lines() {
        let input = "this is not a rule\nalert tcp any any -> any 80 (sid:1;)\n";
        let (lines, stats) = run(input, Settings::default());

        assert_eq!(lines.len(), 1);
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.errors, 1);
    }

    #[test]
    fn test_convert_preserves_input_order() {
        let input = "alert tcp any any -> any 80 (sid:1;)\n\
                     alert tcp any any -> any 81 (sid:2;)\n\
                     alert tcp any any -> any 82 (sid:3;)\n";
        let (lines, _) = run(input, Settings::default());

        assert_eq!(lines.len(), 3);
        for (line, sid) in lines.iter().zip(["\"sid\":1", "\"sid\":2", "\"sid\":3"]) {
            assert!(line.contains(sid), "{} missing {}", line, sid);
        }
    }

    #[test]
    fn test_convert_sid_filter() {
        let input = "alert tcp any any -> any 80 (sid:1;)\n\
                     alert tcp any any -> any 81 (sid:2;)\n";
        let settings = Settings {
            sid_filter: Some("2".to_string()),
            ..Default::default()
        };
        let (lines, stats) = run(input, settings);

        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("\"sid\":2"));
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.filtered, 1);
        assert_eq!(stats.errors, 0);
    }

    #[test]
    fn test_convert_sid_filter_passes_records_without_metadata() {
        let input = "alert tcp any any -> any 80 (msg:\"no identifiers\";)\n";
        let settings = Settings {
            sid_filter: Some("42".to_string()),
            ..Default::default()
        };
        let (lines, stats) = run(input, settings);

        assert_eq!(lines.len(), 1);
        assert_eq!(stats.filtered, 0);
    }

    #[test]
    fn test_convert_raw_rule_suppression() {
        let input = "alert tcp any any -> any 80 (sid:1;)\n";

        let (lines, _) = run(input, Settings::default());
        assert!(lines[0].contains("\"raw_rule\""));

        let settings = Settings {
            include_raw: false,
            ..Default::default()
        };
        let (lines, _) = run(input, settings);
        assert!(!lines[0].contains("\"raw_rule\""));
    }

    #[test]
    fn test_convert_pretty_same_content() {
        let input = "alert tcp any any -> any 80 (sid:1;)\n";

        let (compact, _) = run(input, Settings::default());
        let settings = Settings {
            pretty: true,
            ..Default::default()
        };
        let converter = Converter::new(settings);
        let mut out = Vec::new();
        converter.convert(Cursor::new(input), &mut out).unwrap();
        let pretty = String::from_utf8(out).unwrap();

        let a: serde_json::Value = serde_json::from_str(&compact[0]).unwrap();
        let b: serde_json::Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_output_filename() {
        assert_eq!(
            output_filename(Path::new("local.rules")),
            PathBuf::from("local.ndjson")
        );
        assert_eq!(
            output_filename(Path::new("rules/emerging-dns.rules")),
            PathBuf::from("rules/emerging-dns.ndjson")
        );
        assert_eq!(
            output_filename(Path::new("rules")),
            PathBuf::from("rules.ndjson")
        );
        assert_eq!(
            output_filename(Path::new("rules.d/local")),
            PathBuf::from("rules.d/local.ndjson")
        );
    }
}
