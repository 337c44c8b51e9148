//! Configuration primitives and loader for the document archive.
//!
//! The loader resolves `.doc-archive.toml` using the precedence stack
//! override flag → working directory → git root → built-in defaults.
//! Parsed settings are normalised into typed structures so downstream crates
//! never touch raw TOML.

mod file_type;

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use serde::Deserialize;
use thiserror::Error;

pub use file_type::{FileType, UnknownFileType};

const CONFIG_FILE_NAME: &str = ".doc-archive.toml";

const DEFAULT_PAGE_SIZE: usize = 10;
const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [10, 25, 50, 100];
const DEFAULT_REPOSITORY_PATH: &str = "data/documents.json";
const DEFAULT_DOCS_DIR: &str = "src/docs";
const DEFAULT_DESCRIPTION_LIMIT: usize = 300;

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub browse: BrowseSettings,
    pub repository: RepositorySettings,
    pub scan: ScanSettings,
    pub sources: ConfigSources,
}

/// Initial query state for browsing sessions.
#[derive(Clone, Debug)]
pub struct BrowseSettings {
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub enabled_types: Vec<FileType>,
}

/// Location of the document table.
#[derive(Clone, Debug)]
pub struct RepositorySettings {
    pub path: PathBuf,
}

/// Settings that govern directory scanning.
#[derive(Clone, Debug)]
pub struct ScanSettings {
    pub docs_dir: PathBuf,
    pub exclude: PatternList,
    pub description_limit: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        ScanSettings {
            docs_dir: PathBuf::from(DEFAULT_DOCS_DIR),
            exclude: PatternList::default(),
            description_limit: DEFAULT_DESCRIPTION_LIMIT,
        }
    }
}

/// Pattern plus compiled matcher.
#[derive(Clone, Debug)]
pub struct Pattern {
    original: String,
    matcher: GlobMatcher,
}

impl Pattern {
    fn new(source: ConfigSource, value: String) -> Result<Self, ConfigValidationError> {
        match Glob::new(&value) {
            Ok(glob) => Ok(Pattern {
                original: value,
                matcher: glob.compile_matcher(),
            }),
            Err(err) => Err(ConfigValidationError::new(
                Some(source),
                format!("invalid glob pattern '{value}': {err}"),
            )),
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_match(&self, path: &Path) -> bool {
        self.matcher.is_match(path)
    }
}

/// Ordered list of glob patterns.
#[derive(Clone, Debug, Default)]
pub struct PatternList {
    patterns: Vec<Pattern>,
}

impl PatternList {
    fn new(patterns: Vec<Pattern>) -> Self {
        PatternList { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// True when any pattern matches `path`.
    pub fn matches(&self, path: &Path) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(path))
    }
}

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration (default/git/local/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
    pub base_dir: PathBuf,
}

impl ConfigSource {
    fn default(base_dir: PathBuf) -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
            base_dir,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        ConfigSource {
            kind,
            path: Some(path),
            base_dir,
        }
    }

    fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let default_source = ConfigSource::default(working_dir.clone());
        let mut merged = PartialConfig::default();
        merged.merge(defaults_layer(default_source.clone()));

        let mut source_layers = vec![default_source];

        let git_root = find_git_root(&working_dir);
        let git_config_path = git_root.as_ref().map(|root| root.join(CONFIG_FILE_NAME));
        let local_config_path = working_dir.join(CONFIG_FILE_NAME);

        if let Some(path) = git_config_path.as_ref() {
            if path.exists() && Some(path) != override_path.as_ref() && path != &local_config_path {
                let source = ConfigSource::for_file(ConfigSourceKind::GitRoot, path.clone());
                merged.merge(load_layer(path, source.clone())?);
                source_layers.push(source);
            }
        }

        if local_config_path.exists() && Some(&local_config_path) != override_path.as_ref() {
            let source = ConfigSource::for_file(ConfigSourceKind::Local, local_config_path.clone());
            merged.merge(load_layer(&local_config_path, source.clone())?);
            source_layers.push(source);
        }

        if let Some(path) = override_path {
            let source = ConfigSource::for_file(ConfigSourceKind::Override, path.clone());
            merged.merge(load_layer(&path, source.clone())?);
            source_layers.push(source);
        }

        let resolved = merged.finalize().map_err(ConfigError::Validation)?;
        Ok(Config {
            browse: resolved.browse,
            repository: resolved.repository,
            scan: resolved.scan,
            sources: ConfigSources {
                working_directory: working_dir,
                layers: source_layers,
            },
        })
    }
}

impl Default for Config {
    /// Built-in defaults relative to `.`, without consulting the filesystem.
    fn default() -> Self {
        let source = ConfigSource::default(PathBuf::from("."));
        let resolved = defaults_layer(source.clone())
            .finalize()
            .unwrap_or_else(|err| panic!("built-in doc-archive defaults are invalid: {err}"));
        Config {
            browse: resolved.browse,
            repository: resolved.repository,
            scan: resolved.scan,
            sources: ConfigSources {
                working_directory: PathBuf::from("."),
                layers: vec![source],
            },
        }
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn load_layer(path: &Path, source: ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })?;
    Ok(raw.into_partial(source))
}

fn defaults_layer(source: ConfigSource) -> PartialConfig {
    let browse = BrowsePartial {
        page_size: Some(Located::new(DEFAULT_PAGE_SIZE, source.clone())),
        page_size_options: Some(Located::new(
            DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            source.clone(),
        )),
        enabled_types: Some(Located::new(
            FileType::ALL
                .iter()
                .map(|file_type| file_type.as_str().to_string())
                .collect(),
            source.clone(),
        )),
    };

    let repository = RepositoryPartial {
        path: Some(Located::new(
            PathBuf::from(DEFAULT_REPOSITORY_PATH),
            source.clone(),
        )),
    };

    let scan = ScanPartial {
        docs_dir: Some(Located::new(PathBuf::from(DEFAULT_DOCS_DIR), source.clone())),
        exclude: Some(Located::new(Vec::new(), source.clone())),
        description_limit: Some(Located::new(DEFAULT_DESCRIPTION_LIMIT, source)),
    };

    PartialConfig {
        browse: Some(browse),
        repository: Some(repository),
        scan: Some(scan),
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    browse: Option<BrowsePartial>,
    repository: Option<RepositoryPartial>,
    scan: Option<ScanPartial>,
}

impl PartialConfig {
    fn merge(&mut self, mut other: PartialConfig) {
        if let Some(other_browse) = other.browse.take() {
            match &mut self.browse {
                Some(browse) => browse.merge(other_browse),
                None => self.browse = Some(other_browse),
            }
        }

        if let Some(other_repository) = other.repository.take() {
            match &mut self.repository {
                Some(repository) => repository.merge(other_repository),
                None => self.repository = Some(other_repository),
            }
        }

        if let Some(other_scan) = other.scan.take() {
            match &mut self.scan {
                Some(scan) => scan.merge(other_scan),
                None => self.scan = Some(other_scan),
            }
        }
    }

    fn finalize(self) -> Result<ResolvedConfig, ConfigValidationErrors> {
        let mut errors = Vec::new();
        let fallback = || ConfigSource::default(PathBuf::from("."));

        let browse_partial = self.browse.unwrap_or_default();
        let page_size = browse_partial
            .page_size
            .unwrap_or_else(|| Located::new(DEFAULT_PAGE_SIZE, fallback()));
        if page_size.value == 0 {
            errors.push(ConfigValidationError::new(
                Some(page_size.source.clone()),
                "browse.page_size must be at least 1".into(),
            ));
        }

        let page_size_options = browse_partial
            .page_size_options
            .unwrap_or_else(|| Located::new(DEFAULT_PAGE_SIZE_OPTIONS.to_vec(), fallback()));
        if page_size_options.value.is_empty() {
            errors.push(ConfigValidationError::new(
                Some(page_size_options.source.clone()),
                "browse.page_size_options cannot be empty".into(),
            ));
        }
        if page_size_options.value.contains(&0) {
            errors.push(ConfigValidationError::new(
                Some(page_size_options.source.clone()),
                "browse.page_size_options entries must be at least 1".into(),
            ));
        }

        let enabled_types = browse_partial.enabled_types.unwrap_or_else(|| {
            Located::new(
                FileType::ALL.iter().map(|t| t.as_str().to_string()).collect(),
                fallback(),
            )
        });
        let enabled_types = parse_file_types(enabled_types, &mut errors);

        let repository_partial = self.repository.unwrap_or_default();
        let repository_path = repository_partial
            .path
            .unwrap_or_else(|| Located::new(PathBuf::from(DEFAULT_REPOSITORY_PATH), fallback()));

        let scan_partial = self.scan.unwrap_or_default();
        let docs_dir = scan_partial
            .docs_dir
            .unwrap_or_else(|| Located::new(PathBuf::from(DEFAULT_DOCS_DIR), fallback()));
        let exclude = compile_patterns(
            scan_partial.exclude.unwrap_or_default(),
            "scan.exclude",
            &mut errors,
        );
        let description_limit = scan_partial
            .description_limit
            .unwrap_or_else(|| Located::new(DEFAULT_DESCRIPTION_LIMIT, fallback()));
        if description_limit.value == 0 {
            errors.push(ConfigValidationError::new(
                Some(description_limit.source.clone()),
                "scan.description_limit must be at least 1".into(),
            ));
        }

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        Ok(ResolvedConfig {
            browse: BrowseSettings {
                page_size: page_size.value,
                page_size_options: page_size_options.value,
                enabled_types,
            },
            repository: RepositorySettings {
                path: resolve_path(&repository_path),
            },
            scan: ScanSettings {
                docs_dir: resolve_path(&docs_dir),
                exclude: PatternList::new(exclude),
                description_limit: description_limit.value,
            },
        })
    }
}

#[derive(Clone, Debug, Default)]
struct BrowsePartial {
    page_size: Option<Located<usize>>,
    page_size_options: Option<Located<Vec<usize>>>,
    enabled_types: Option<Located<Vec<String>>>,
}

impl BrowsePartial {
    fn merge(&mut self, other: BrowsePartial) {
        if other.page_size.is_some() {
            self.page_size = other.page_size;
        }
        if other.page_size_options.is_some() {
            self.page_size_options = other.page_size_options;
        }
        if other.enabled_types.is_some() {
            self.enabled_types = other.enabled_types;
        }
    }
}

#[derive(Clone, Debug, Default)]
struct RepositoryPartial {
    path: Option<Located<PathBuf>>,
}

impl RepositoryPartial {
    fn merge(&mut self, other: RepositoryPartial) {
        if other.path.is_some() {
            self.path = other.path;
        }
    }
}

#[derive(Clone, Debug, Default)]
struct ScanPartial {
    docs_dir: Option<Located<PathBuf>>,
    exclude: Option<Located<Vec<String>>>,
    description_limit: Option<Located<usize>>,
}

impl ScanPartial {
    fn merge(&mut self, other: ScanPartial) {
        if other.docs_dir.is_some() {
            self.docs_dir = other.docs_dir;
        }
        if other.exclude.is_some() {
            self.exclude = other.exclude;
        }
        if other.description_limit.is_some() {
            self.description_limit = other.description_limit;
        }
    }
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

impl Default for Located<Vec<String>> {
    fn default() -> Self {
        Located::new(Vec::new(), ConfigSource::default(PathBuf::from(".")))
    }
}

fn resolve_path(located: &Located<PathBuf>) -> PathBuf {
    let path = &located.value;
    if path.is_absolute() {
        path.clone()
    } else {
        located.source.base_dir.join(path)
    }
}

fn compile_patterns(
    located: Located<Vec<String>>,
    context: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<Pattern> {
    let mut patterns = Vec::new();
    for pattern in located.value {
        match Pattern::new(located.source.clone(), pattern) {
            Ok(compiled) => patterns.push(compiled),
            Err(err) => errors.push(err.with_context(context)),
        }
    }
    patterns
}

fn parse_file_types(
    located: Located<Vec<String>>,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<FileType> {
    let mut types = Vec::new();
    for name in &located.value {
        match name.parse::<FileType>() {
            Ok(file_type) => {
                if !types.contains(&file_type) {
                    types.push(file_type);
                }
            }
            Err(err) => errors.push(
                ConfigValidationError::new(Some(located.source.clone()), err.to_string())
                    .with_context("browse.enabled_types"),
            ),
        }
    }
    types
}

#[derive(Clone, Debug)]
struct ResolvedConfig {
    browse: BrowseSettings,
    repository: RepositorySettings,
    scan: ScanSettings,
}

/// Container for validation failures, formatted as a bullet list.
#[derive(Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    browse: Option<RawBrowse>,
    #[serde(default)]
    repository: Option<RawRepository>,
    #[serde(default)]
    scan: Option<RawScan>,
}

impl RawConfig {
    fn into_partial(self, source: ConfigSource) -> PartialConfig {
        PartialConfig {
            browse: self.browse.map(|browse| browse.into_partial(source.clone())),
            repository: self
                .repository
                .map(|repository| repository.into_partial(source.clone())),
            scan: self.scan.map(|scan| scan.into_partial(source)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawBrowse {
    #[serde(default)]
    page_size: Option<usize>,
    #[serde(default)]
    page_size_options: Option<Vec<usize>>,
    #[serde(default)]
    enabled_types: Option<Vec<String>>,
}

impl RawBrowse {
    fn into_partial(self, source: ConfigSource) -> BrowsePartial {
        BrowsePartial {
            page_size: self
                .page_size
                .map(|value| Located::new(value, source.clone())),
            page_size_options: self
                .page_size_options
                .map(|value| Located::new(value, source.clone())),
            enabled_types: self
                .enabled_types
                .map(|value| Located::new(value, source)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    #[serde(default)]
    path: Option<PathBuf>,
}

impl RawRepository {
    fn into_partial(self, source: ConfigSource) -> RepositoryPartial {
        RepositoryPartial {
            path: self.path.map(|value| Located::new(value, source)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawScan {
    #[serde(default)]
    docs_dir: Option<PathBuf>,
    #[serde(default)]
    exclude: Option<Vec<String>>,
    #[serde(default)]
    description_limit: Option<usize>,
}

impl RawScan {
    fn into_partial(self, source: ConfigSource) -> ScanPartial {
        ScanPartial {
            docs_dir: self
                .docs_dir
                .map(|value| Located::new(value, source.clone())),
            exclude: self
                .exclude
                .map(|value| Located::new(value, source.clone())),
            description_limit: self
                .description_limit
                .map(|value| Located::new(value, source)),
        }
    }
}
