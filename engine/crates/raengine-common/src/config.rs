//! Configuration management for RAEngine components

use raengine_core::{Error, Result, ServiceScore, ServiceScores};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use tracing::warn;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Run settings, scoring weights and classification thresholds
    pub settings: Settings,

    /// Attack-type taxonomy, in file order
    #[serde(default)]
    pub attack_table: AttackTable,

    /// Service criticality by port
    #[serde(default)]
    pub service_pa_scores: ServiceScores,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file. `.json` files are parsed as JSON,
    /// everything else as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Parse configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Create a configuration builder
    pub fn builder(weights: Weights, thresholds: Thresholds) -> ConfigBuilder {
        ConfigBuilder::new(weights, thresholds)
    }

    /// Merge with environment variables (RAENGINE_ prefix)
    pub fn merge_env(mut self) -> Self {
        if let Ok(val) = std::env::var("RAENGINE_DATA_DIR") {
            self.settings.data_dir = val;
        }
        if let Ok(val) = std::env::var("RAENGINE_OUTPUT_DIR") {
            self.settings.output_dir = val;
        }
        if let Ok(val) = std::env::var("RAENGINE_CONNECTIONS_DIR") {
            self.settings.connections_dir = val;
        }
        if let Ok(val) = std::env::var("RAENGINE_WINDOW_DAYS") {
            match val.parse() {
                Ok(n) => self.settings.connection_window_days = n,
                Err(e) => warn!(
                    value = %val,
                    "Ignoring RAENGINE_WINDOW_DAYS, keeping {} days: {}",
                    self.settings.connection_window_days,
                    e
                ),
            }
        }

        // Logging
        if let Ok(val) = std::env::var("RAENGINE_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("RAENGINE_LOG_FORMAT") {
            self.logging.format = val;
        }

        self
    }

    /// Reject values the scoring passes cannot work with
    pub fn validate(&self) -> Result<()> {
        self.settings.weights.validate()?;
        self.settings.thresholds.validate()?;

        for attack in self.attack_table.iter() {
            if !(0.0..=10.0).contains(&attack.score) {
                return Err(Error::InvalidConfig {
                    key: format!("attack_table.{}.score", attack.name),
                    message: format!("{} is outside 0-10", attack.score),
                });
            }
        }

        for (port, score) in &self.service_pa_scores.ports {
            if port.parse::<u16>().is_err() {
                return Err(Error::InvalidConfig {
                    key: format!("service_pa_scores.{}", port),
                    message: "key is not a port number".into(),
                });
            }
            if !score.protection.is_finite() || !score.availability.is_finite() {
                return Err(Error::InvalidConfig {
                    key: format!("service_pa_scores.{}", port),
                    message: "weights must be finite".into(),
                });
            }
        }

        if self.settings.csv_output.trim().is_empty() {
            return Err(Error::MissingConfig {
                key: "settings.csv_output".into(),
            });
        }

        Ok(())
    }
}

/// Run-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Organisation abbreviation, used in the output path
    #[serde(default = "default_org")]
    pub org_abbr: String,

    /// Directory holding the persisted snapshot
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Root directory for run reports
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Analysis report file name
    #[serde(default = "default_csv_output")]
    pub csv_output: String,

    /// Host impact report file name
    #[serde(default = "default_host_csv")]
    pub host_impact_csv: String,

    /// chrono format used for run directories and connection log file names
    #[serde(default = "default_datestr")]
    pub datestr_format: String,

    /// Directory of per-run connection count files
    #[serde(default = "default_connections_dir")]
    pub connections_dir: String,

    /// Trailing window (days) over which connection counts are summed
    #[serde(default = "default_window_days")]
    pub connection_window_days: u32,

    /// Metadata rows preceding the data in a scanner report export
    #[serde(default = "default_preamble_rows")]
    pub report_preamble_rows: usize,

    /// Scanner report export to ingest
    pub report_path: Option<String>,

    /// Range reference data (VLAN CSV or JSON)
    pub range_path: Option<String>,

    /// Scoring weights
    pub weights: Weights,

    /// Classification thresholds
    pub thresholds: Thresholds,
}

fn default_org() -> String {
    String::from("org")
}

fn default_data_dir() -> String {
    String::from("data/")
}

fn default_output_dir() -> String {
    String::from("output")
}

fn default_csv_output() -> String {
    String::from("RAEngine.csv")
}

fn default_host_csv() -> String {
    String::from("HostImpact.csv")
}

fn default_datestr() -> String {
    String::from("%Y-%m-%d_%H-%M-%S")
}

fn default_connections_dir() -> String {
    String::from("data/connections")
}

fn default_window_days() -> u32 {
    90
}

fn default_preamble_rows() -> usize {
    5
}

impl Settings {
    /// Settings with default paths and the given scoring parameters
    pub fn new(weights: Weights, thresholds: Thresholds) -> Self {
        Self {
            org_abbr: default_org(),
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            csv_output: default_csv_output(),
            host_impact_csv: default_host_csv(),
            datestr_format: default_datestr(),
            connections_dir: default_connections_dir(),
            connection_window_days: default_window_days(),
            report_preamble_rows: default_preamble_rows(),
            report_path: None,
            range_path: None,
            weights,
            thresholds,
        }
    }
}

/// Scoring weights. Every key is required.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub risk: RiskWeights,
    pub impact: ImpactWeights,
    pub overall: OverallWeights,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    pub cvss: f64,
    pub sev: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactWeights {
    pub attack_surface: AttackSurfaceWeights,
    pub protection: ProtectionWeights,
    pub availability: AvailabilityWeights,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackSurfaceWeights {
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProtectionWeights {
    /// Share of the vulnerability impact score
    pub total: f64,
    /// Weight of the subnet trust tier in host protection
    pub identity: f64,
    /// Weight of the exposed-service role in host protection
    pub role: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityWeights {
    /// Share of the vulnerability impact score
    pub total: f64,
    pub service: f64,
    pub network_density: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverallWeights {
    pub risk: f64,
    pub impact: f64,
}

impl Weights {
    fn validate(&self) -> Result<()> {
        let entries = [
            ("risk.cvss", self.risk.cvss),
            ("risk.sev", self.risk.sev),
            ("impact.attack_surface.total", self.impact.attack_surface.total),
            ("impact.protection.total", self.impact.protection.total),
            ("impact.protection.identity", self.impact.protection.identity),
            ("impact.protection.role", self.impact.protection.role),
            ("impact.availability.total", self.impact.availability.total),
            ("impact.availability.service", self.impact.availability.service),
            (
                "impact.availability.network_density",
                self.impact.availability.network_density,
            ),
            ("overall.risk", self.overall.risk),
            ("overall.impact", self.overall.impact),
        ];

        for (key, value) in entries {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig {
                    key: format!("settings.weights.{}", key),
                    message: format!("{} is not a non-negative number", value),
                });
            }
        }
        Ok(())
    }
}

/// Classification thresholds and type keyword lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub critical: BandRange,
    pub high: BandRange,
    pub medium: BandRange,
    /// Types that upgrade a score just below critical
    pub critical_types: KeywordList,
    /// Types that, when critical and exploitable, are out of band
    pub outofband_types: KeywordList,
}

impl Thresholds {
    fn validate(&self) -> Result<()> {
        if self.high.upper > self.critical.lower {
            return Err(Error::InvalidConfig {
                key: "settings.thresholds.high".into(),
                message: format!(
                    "upper bound {} overlaps critical lower bound {}",
                    self.high.upper, self.critical.lower
                ),
            });
        }
        if self.medium.upper > self.high.lower {
            return Err(Error::InvalidConfig {
                key: "settings.thresholds.medium".into(),
                message: format!(
                    "upper bound {} overlaps high lower bound {}",
                    self.medium.upper, self.high.lower
                ),
            });
        }
        Ok(())
    }
}

/// Inclusive score range written as `"lower-upper"`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BandRange {
    pub lower: f64,
    pub upper: f64,
}

impl BandRange {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Inclusive on both ends
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

impl std::str::FromStr for BandRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (lower, upper) = s
            .split_once('-')
            .ok_or_else(|| format!("range {:?} is not of the form \"lower-upper\"", s))?;
        let lower: f64 = lower
            .trim()
            .parse()
            .map_err(|_| format!("invalid lower bound in {:?}", s))?;
        let upper: f64 = upper
            .trim()
            .parse()
            .map_err(|_| format!("invalid upper bound in {:?}", s))?;
        if lower > upper {
            return Err(format!("lower bound exceeds upper bound in {:?}", s));
        }
        Ok(Self { lower, upper })
    }
}

impl TryFrom<String> for BandRange {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BandRange> for String {
    fn from(range: BandRange) -> Self {
        format!("{}-{}", range.lower, range.upper)
    }
}

/// Keywords written either as a comma-separated string or an array.
/// Entries are trimmed and blanks dropped; case is kept as configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "KeywordSource", into = "Vec<String>")]
pub struct KeywordList(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum KeywordSource {
    Joined(String),
    List(Vec<String>),
}

impl From<KeywordSource> for KeywordList {
    fn from(source: KeywordSource) -> Self {
        let items: Vec<String> = match source {
            KeywordSource::Joined(s) => s.split(',').map(str::to_string).collect(),
            KeywordSource::List(v) => v,
        };
        KeywordList(
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

impl From<KeywordList> for Vec<String> {
    fn from(list: KeywordList) -> Self {
        list.0
    }
}

impl KeywordList {
    pub fn from_csv(s: &str) -> Self {
        KeywordSource::Joined(s.to_string()).into()
    }

    /// First keyword occurring in `text`, case-sensitive
    pub fn first_in(&self, text: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|kw| text.contains(kw.as_str()))
            .map(String::as_str)
    }
}

/// One attack type of the taxonomy
#[derive(Debug, Clone, PartialEq)]
pub struct AttackType {
    pub name: String,
    /// Lower-cased, trimmed, non-empty keywords
    pub keywords: Vec<String>,
    /// Base score on a 0-10 scale
    pub score: f64,
}

impl AttackType {
    pub fn new(name: impl Into<String>, keywords: &str, score: f64) -> Self {
        Self {
            name: name.into(),
            keywords: keywords
                .split(',')
                .map(|kw| kw.trim().to_lowercase())
                .filter(|kw| !kw.is_empty())
                .collect(),
            score,
        }
    }
}

/// Attack types in the order they appear in the configuration file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttackTable(Vec<AttackType>);

impl AttackTable {
    pub fn new(types: Vec<AttackType>) -> Self {
        Self(types)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttackType> {
        self.0.iter()
    }

    pub fn push(&mut self, attack: AttackType) {
        self.0.push(attack);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Deserialize)]
struct RawAttackType {
    keywords: String,
    score: RawScore,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScore {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for AttackTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = AttackTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of attack type name to {keywords, score}")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut table = AttackTable::default();
                while let Some((name, raw)) = map.next_entry::<String, RawAttackType>()? {
                    let score = match raw.score {
                        RawScore::Number(n) => n,
                        RawScore::Text(s) => s.trim().parse().map_err(|_| {
                            de::Error::custom(format!(
                                "attack type {:?} has non-numeric score {:?}",
                                name, s
                            ))
                        })?,
                    };
                    table.push(AttackType::new(name, &raw.keywords, score));
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

impl Serialize for AttackTable {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct Entry {
            keywords: String,
            score: f64,
        }

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for attack in &self.0 {
            map.serialize_entry(
                &attack.name,
                &Entry {
                    keywords: attack.keywords.join(","),
                    score: attack.score,
                },
            )?;
        }
        map.end()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_format() -> String {
    String::from("pretty")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Builder for constructing Config in code
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new(weights: Weights, thresholds: Thresholds) -> Self {
        Self {
            config: Config {
                settings: Settings::new(weights, thresholds),
                attack_table: AttackTable::default(),
                service_pa_scores: ServiceScores::default(),
                logging: LoggingConfig::default(),
            },
        }
    }

    pub fn attack_type(mut self, name: &str, keywords: &str, score: f64) -> Self {
        self.config
            .attack_table
            .push(AttackType::new(name, keywords, score));
        self
    }

    pub fn service(mut self, port: u16, protection: f64, availability: f64) -> Self {
        self.config.service_pa_scores.ports.insert(
            port.to_string(),
            ServiceScore {
                protection,
                availability,
            },
        );
        self
    }

    pub fn data_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.settings.data_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.settings.output_dir = dir.into();
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
        [settings]
        org_abbr = "acme"
        data_dir = "/var/lib/raengine/"
        csv_output = "Report.csv"

        [settings.weights.risk]
        cvss = 0.5
        sev = 0.5

        [settings.weights.impact.attack_surface]
        total = 0.4

        [settings.weights.impact.protection]
        total = 0.3
        identity = 0.6
        role = 0.4

        [settings.weights.impact.availability]
        total = 0.3
        service = 0.5
        network_density = 0.5

        [settings.weights.overall]
        risk = 0.6
        impact = 0.4

        [settings.thresholds]
        critical = "8-10"
        high = "6-7.5"
        medium = "4-5.999"
        critical_types = "Remote Code Execution, SQL Injection"
        outofband_types = ["Remote Code Execution"]

        [attack_table.xss]
        keywords = "cross-site scripting, XSS"
        score = "6"

        [attack_table.rce]
        keywords = "remote code execution,arbitrary code"
        score = 10

        [attack_table.dos]
        keywords = "denial of service"
        score = 4.5

        [service_pa_scores."443"]
        protection = 4
        availability = 5

        [logging]
        level = "debug"
    "#;

    #[test]
    fn test_config_from_toml() {
        let config = Config::from_toml(TOML).unwrap();
        assert_eq!(config.settings.org_abbr, "acme");
        assert_eq!(config.settings.connection_window_days, 90);
        assert_eq!(config.settings.weights.impact.protection.identity, 0.6);
        assert_eq!(config.settings.thresholds.high, BandRange::new(6.0, 7.5));
        assert_eq!(
            config.settings.thresholds.critical_types.0,
            vec!["Remote Code Execution", "SQL Injection"]
        );
        assert_eq!(config.service_pa_scores.get(443).unwrap().availability, 5.0);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_attack_table_keeps_file_order() {
        let config = Config::from_toml(TOML).unwrap();
        let names: Vec<_> = config.attack_table.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["xss", "rce", "dos"]);

        let xss = config.attack_table.iter().next().unwrap();
        assert_eq!(xss.keywords, vec!["cross-site scripting", "xss"]);
        assert_eq!(xss.score, 6.0);
    }

    #[test]
    fn test_missing_weights_are_fatal() {
        let toml = r#"
            [settings.weights.risk]
            cvss = 0.5
        "#;
        let err = Config::from_toml(toml).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_malformed_threshold() {
        let bad = TOML.replace(r#"critical = "8-10""#, r#"critical = "eight""#);
        assert!(Config::from_toml(&bad).is_err());
    }

    #[test]
    fn test_non_numeric_score() {
        let bad = TOML.replace(r#"score = "6""#, r#"score = "six""#);
        assert!(Config::from_toml(&bad).is_err());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "settings": {
                "weights": {
                    "risk": {"cvss": 0.5, "sev": 0.5},
                    "impact": {
                        "attack_surface": {"total": 0.4},
                        "protection": {"total": 0.3, "identity": 0.5, "role": 0.5},
                        "availability": {"total": 0.3, "service": 0.5, "network_density": 0.5}
                    },
                    "overall": {"risk": 0.5, "impact": 0.5}
                },
                "thresholds": {
                    "critical": "8-10", "high": "6-7", "medium": "4-5.9",
                    "critical_types": "Overflow", "outofband_types": ""
                }
            },
            "attack_table": {
                "overflow": {"keywords": "buffer overflow", "score": "9"},
                "auth": {"keywords": "authentication bypass", "score": "8"}
            },
            "data_ingestion": {"qualys": {"hostname": "ignored"}}
        }"#;

        let config = Config::from_json(json).unwrap();
        let names: Vec<_> = config.attack_table.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["overflow", "auth"]);
        assert!(config.settings.thresholds.outofband_types.0.is_empty());
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let toml_path = dir.path().join("raengine.toml");
        std::fs::write(&toml_path, TOML).unwrap();
        assert_eq!(Config::from_file(&toml_path).unwrap().settings.org_abbr, "acme");

        let json_path = dir.path().join("raengine.json");
        let json = serde_json::to_string(&Config::from_toml(TOML).unwrap()).unwrap();
        std::fs::write(&json_path, json).unwrap();
        let config = Config::from_file(&json_path).unwrap();
        assert_eq!(config.attack_table.len(), 3);

        let err = Config::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_band_range_parse() {
        let range: BandRange = "4.5-6".parse().unwrap();
        assert!(range.contains(4.5));
        assert!(range.contains(6.0));
        assert!(!range.contains(6.001));
        assert!("6-4".parse::<BandRange>().is_err());
        assert_eq!(String::from(range), "4.5-6");
    }

    #[test]
    fn test_keyword_list_first_match() {
        let list = KeywordList::from_csv("SQL Injection, ,Remote Code Execution");
        assert_eq!(list.0.len(), 2);
        assert_eq!(
            list.first_in("overflow, Remote Code Execution"),
            Some("Remote Code Execution")
        );
        assert_eq!(list.first_in("remote code execution"), None);
    }

    #[test]
    fn test_config_builder() {
        let config = Config::from_toml(TOML).unwrap();
        let built = Config::builder(config.settings.weights, config.settings.thresholds.clone())
            .attack_type("sqli", "sql injection", 9.0)
            .service(22, 5.0, 2.0)
            .data_dir("/tmp/ra/")
            .log_level("warn")
            .build()
            .unwrap();

        assert_eq!(built.attack_table.len(), 1);
        assert_eq!(built.settings.data_dir, "/tmp/ra/");
        assert_eq!(built.logging.level, "warn");
    }

    #[test]
    fn test_merge_env_window_days() {
        let default_days = Config::from_toml(TOML).unwrap().settings.connection_window_days;

        std::env::set_var("RAENGINE_WINDOW_DAYS", "ninety");
        let config = Config::from_toml(TOML).unwrap().merge_env();
        assert_eq!(config.settings.connection_window_days, default_days);

        std::env::set_var("RAENGINE_WINDOW_DAYS", "30");
        let config = Config::from_toml(TOML).unwrap().merge_env();
        std::env::remove_var("RAENGINE_WINDOW_DAYS");
        assert_eq!(config.settings.connection_window_days, 30);
    }

    #[test]
    fn test_builder_rejects_out_of_range_score() {
        let config = Config::from_toml(TOML).unwrap();
        let result = Config::builder(config.settings.weights, config.settings.thresholds)
            .attack_type("bogus", "x", 12.0)
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }
}
