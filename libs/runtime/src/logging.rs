use crate::config::{LoggingConfig, Section};
use file_rotate::{compression::Compression, suffix::AppendCount, ContentLimit, FileRotate};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{level_filters::LevelFilter, Level, Metadata, Subscriber};
use tracing_subscriber::{
    filter::{FilterFn, Targets},
    fmt::{self, time::UtcTime},
    layer::{Filter, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
    Layer, Registry,
};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

/// `None` means the sink is switched off. Unknown names fall back to INFO.
fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_ascii_lowercase().as_str() {
        "off" | "none" => None,
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => Some(Level::INFO),
    }
}

/// `jsonapi_core` owns `jsonapi_core` and `jsonapi_core::document`, not `jsonapi_core_x`.
fn owns_target(subsystem: &str, target: &str) -> bool {
    target
        .strip_prefix(subsystem)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

// -------- file sinks --------

#[derive(Clone)]
struct SharedRotate(Arc<Mutex<FileRotate<AppendCount>>>);

impl SharedRotate {
    fn open(path: &Path, max_bytes: usize, max_backups: usize) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let rotate = FileRotate::new(
            path,
            AppendCount::new(max_backups),
            ContentLimit::BytesSurpassed(max_bytes),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self(Arc::new(Mutex::new(rotate))))
    }
}

/// Writer handed to the fmt layer; writes vanish when no file is configured.
struct SinkWriter(Option<SharedRotate>);

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.0 {
            Some(sink) => sink.0.lock().write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &self.0 {
            Some(sink) => sink.0.lock().flush(),
            None => Ok(()),
        }
    }
}

/// Picks the subsystem file for a record's target, else the default file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<SharedRotate>,
    subsystems: HashMap<String, SharedRotate>,
}

impl FileRouter {
    fn sink_for(&self, target: &str) -> Option<SharedRotate> {
        self.subsystems
            .iter()
            .find(|(name, _)| owns_target(name, target))
            .map(|(_, sink)| sink.clone())
            .or_else(|| self.default.clone())
    }

    fn has_subsystem_files(&self) -> bool {
        !self.subsystems.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        SinkWriter(self.sink_for(meta.target()))
    }
}

fn log_file_path(file: &str, base_dir: &Path) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn open_section_sink(name: &str, section: &Section, base_dir: &Path) -> Option<SharedRotate> {
    if section.file.trim().is_empty() {
        return None;
    }
    let path = log_file_path(&section.file, base_dir);
    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let max_backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);

    SharedRotate::open(&path, max_bytes as usize, max_backups)
        .map_err(|e| {
            // no subscriber is installed yet
            eprintln!("Failed to open log file '{}' for section '{name}': {e}", path.display());
        })
        .ok()
}

// -------- layout --------

/// The logging config split into the catch-all section and named subsystems.
struct LogPlan<'a> {
    default: Option<&'a Section>,
    subsystems: Vec<(&'a str, &'a Section)>,
}

impl<'a> LogPlan<'a> {
    fn new(cfg: &'a LoggingConfig) -> Self {
        let mut subsystems: Vec<_> = cfg
            .iter()
            .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
            .map(|(name, section)| (name.as_str(), section))
            .collect();
        subsystems.sort_by_key(|(name, _)| *name);
        Self {
            default: cfg.get(DEFAULT_SECTION),
            subsystems,
        }
    }

    fn claimed(&self) -> Vec<String> {
        self.subsystems.iter().map(|(name, _)| name.to_string()).collect()
    }

    /// Per-subsystem filter; targets outside every subsystem are dropped.
    fn console_targets(&self) -> Targets {
        self.targets(|section| Some(section.console_level.as_str()))
    }

    fn file_targets(&self) -> Targets {
        self.targets(|section| (!section.file.trim().is_empty()).then_some(section.file_level.as_str()))
    }

    fn targets(&self, level_of: impl Fn(&Section) -> Option<&str>) -> Targets {
        self.subsystems
            .iter()
            .filter_map(|(name, section)| level_of(*section).and_then(parse_level).map(|level| (*name, level)))
            .fold(Targets::new().with_default(LevelFilter::OFF), |targets, (name, level)| {
                targets.with_target(name, LevelFilter::from_level(level))
            })
    }

    fn file_router(&self, base_dir: &Path) -> FileRouter {
        FileRouter {
            default: self
                .default
                .and_then(|section| open_section_sink(DEFAULT_SECTION, section, base_dir)),
            subsystems: self
                .subsystems
                .iter()
                .filter_map(|(name, section)| {
                    open_section_sink(name, section, base_dir).map(|sink| (name.to_string(), sink))
                })
                .collect(),
        }
    }
}

type CatchAll = FilterFn<Box<dyn Fn(&Metadata<'_>) -> bool + Send + Sync + 'static>>;

/// Everything no subsystem claims, up to `max_level`.
fn catch_all(claimed: Vec<String>, max_level: Level) -> CatchAll {
    FilterFn::new(Box::new(move |meta: &Metadata<'_>| {
        meta.level() <= &max_level && !claimed.iter().any(|name| owns_target(name, meta.target()))
    }))
}

fn console_layer<S, F>(ansi: bool, filter: F) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span> + 'static,
    F: Filter<S> + Send + Sync + 'static,
{
    fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .with_filter(filter)
}

fn json_file_layer<S, F>(router: FileRouter, filter: F) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span> + 'static,
    F: Filter<S> + Send + Sync + 'static,
{
    fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(router)
        .with_filter(filter)
}

// -------- public init --------

/// Installs the global subscriber described by `cfg`. Relative log files
/// resolve against `base_dir` (normally `server.home_dir`). Only the first
/// call in a process takes effect.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // route `log` records through tracing
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let plan = LogPlan::new(cfg);
    let router = plan.file_router(base_dir);
    let ansi = atty::is(atty::Stream::Stdout);

    let subsystem_files = router
        .has_subsystem_files()
        .then(|| json_file_layer(router.clone(), plan.file_targets()));

    let default_console = plan
        .default
        .and_then(|section| parse_level(&section.console_level))
        .map(|level| console_layer(ansi, catch_all(plan.claimed(), level)));

    let default_file = plan
        .default
        .filter(|_| router.default.is_some())
        .and_then(|section| parse_level(&section.file_level))
        .map(|level| json_file_layer(router.clone(), catch_all(plan.claimed(), level)));

    let _ = Registry::default()
        .with(console_layer(ansi, plan.console_targets()))
        .with(subsystem_files)
        .with(default_console)
        .with(default_file)
        .try_init();
}

/// Plain console output, used when no logging section is configured.
pub fn init_default_logging() {
    let _ = fmt::fmt()
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_logging_config, AppConfig};
    use std::fs;
    use tempfile::tempdir;

    fn section(file: &str, file_level: &str) -> Section {
        Section {
            console_level: "info".into(),
            file: file.into(),
            file_level: file_level.into(),
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn level_names() {
        assert_eq!(parse_level(" Debug "), Some(Level::DEBUG));
        assert_eq!(parse_level("ERROR"), Some(Level::ERROR));
        assert_eq!(parse_level("off"), None);
        assert_eq!(parse_level("none"), None);
        assert_eq!(parse_level("chatty"), Some(Level::INFO));
    }

    #[test]
    fn subsystem_owns_its_module_paths_only() {
        assert!(owns_target("jsonapi_core", "jsonapi_core"));
        assert!(owns_target("jsonapi_core", "jsonapi_core::document::pipeline"));
        assert!(!owns_target("jsonapi_core", "jsonapi_core_extra"));
        assert!(!owns_target("jsonapi_core", "books::api"));
    }

    #[test]
    fn plan_separates_default_from_subsystems() {
        let mut cfg = default_logging_config();
        cfg.insert("jsonapi_core".into(), section("logs/jsonapi.log", "debug"));
        cfg.insert("books".into(), section("", "debug"));

        let plan = LogPlan::new(&cfg);

        assert!(plan.default.is_some());
        assert_eq!(plan.claimed(), vec!["books".to_string(), "jsonapi_core".to_string()]);
    }

    #[test]
    fn relative_log_files_live_under_base_dir() {
        let tmp = tempdir().unwrap();

        let relative = log_file_path("logs/server.log", tmp.path());
        assert!(relative.starts_with(tmp.path()));

        let absolute = tmp.path().join("abs.log");
        assert_eq!(log_file_path(&absolute.to_string_lossy(), Path::new("/elsewhere")), absolute);
    }

    #[test]
    fn sink_creates_missing_directories() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested/dir/server.log");

        let mut writer = SinkWriter(Some(SharedRotate::open(&path, 128 * 1024, 2).unwrap()));
        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn router_sends_subsystem_records_to_their_own_file() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert(DEFAULT_SECTION.into(), section("logs/default.log", "info"));
        cfg.insert("jsonapi_core".into(), section("logs/jsonapi.log", "debug"));

        let router = LogPlan::new(&cfg).file_router(tmp.path());
        assert!(router.has_subsystem_files());

        let mut core = SinkWriter(router.sink_for("jsonapi_core::document"));
        core.write_all(b"doc\n").unwrap();
        core.flush().unwrap();
        let mut other = SinkWriter(router.sink_for("books::api"));
        other.write_all(b"book\n").unwrap();
        other.flush().unwrap();

        assert_eq!(fs::read_to_string(tmp.path().join("logs/jsonapi.log")).unwrap(), "doc\n");
        assert_eq!(fs::read_to_string(tmp.path().join("logs/default.log")).unwrap(), "book\n");
    }

    #[test]
    fn blank_file_means_no_sink() {
        let tmp = tempdir().unwrap();
        assert!(open_section_sink("books", &section("  ", "debug"), tmp.path()).is_none());

        let mut dropped = SinkWriter(None);
        assert_eq!(dropped.write(b"ignored").unwrap(), 7);
    }

    #[test]
    fn yaml_sections_drive_the_router() {
        let tmp = tempdir().unwrap();
        let config_path = tmp.path().join("cfg.yaml");
        let home = tmp.path().join("home").to_string_lossy().replace('\\', "/");
        fs::write(
            &config_path,
            format!(
                r#"
server:
  home_dir: "{home}"
  host: "127.0.0.1"
  port: 8088
logging:
  default:
    console_level: info
    file: ""
  jsonapi_core:
    console_level: debug
    file: "logs/jsonapi.log"
    file_level: warn
    max_backups: 2
"#
            ),
        )
        .unwrap();

        let config = AppConfig::load_layered(&config_path).unwrap();
        let logging = config.logging.unwrap();
        let router = LogPlan::new(&logging).file_router(Path::new(&config.server.home_dir));

        assert!(router.default.is_none());
        assert!(router.sink_for("books").is_none());
        assert!(router.sink_for("jsonapi_core::request").is_some());
        assert!(Path::new(&config.server.home_dir).join("logs").is_dir());
    }
}
