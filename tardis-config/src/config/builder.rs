//! Configuration construction.
//!
//! [`ConfigurationBuilder`] ties the stages together: load the document,
//! check its version, run the schema, attach `config_dirname`, run the
//! validation pipeline and finally synthesize the `model` section of a
//! CSVY-backed configuration. Construction fails fast; no partially built
//! configuration is ever returned.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value as YamlValue};

use super::loader::{CsvyFrontMatterLoader, CsvyLoader, DocumentLoader};
use super::schema::{SchemaValidator, UnitCoercingSchema};
use super::validator::ConfigValidator;
use super::{TARDIS_CONFIG_VERSION, VERSION_KEY};
use crate::error::{Error, Result};
use crate::namespace::{scalar_key, Namespace, Value};

/// Keys copied from a CSVY header into the synthesized `model` section.
const CSVY_BOUNDARY_KEYS: [&str; 2] = ["v_inner_boundary", "v_outer_boundary"];

/// A validated simulation configuration.
///
/// Dereferences to its root [`Namespace`], so all field and path accessors
/// are available directly.
///
/// # Examples
///
/// ```no_run
/// use tardis_config::Configuration;
///
/// let config = Configuration::from_yaml("tardis_example.yml").unwrap();
/// let t = config.get("supernova.time_explosion").unwrap();
/// println!("time of explosion: {t:?}");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    root: Namespace,
    config_dirname: PathBuf,
}

impl Configuration {
    /// Creates a builder for an in-memory document.
    #[must_use]
    pub fn builder(document: Mapping) -> ConfigurationBuilder {
        ConfigurationBuilder::from_document(document)
    }

    /// Load, validate and build a configuration from a YAML file.
    ///
    /// The version marker is always enforced and `config_dirname` is the
    /// directory containing the file.
    ///
    /// # Errors
    ///
    /// Returns any document, version, schema or validation error.
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        ConfigurationBuilder::from_file(path.as_ref()).build()
    }

    /// Build a configuration from an already loaded document.
    ///
    /// With `validate` set to `false` the document is wrapped as is: no
    /// version check, no unit coercion and no pipeline. The `model` and
    /// `csvy_model` exclusion is enforced either way.
    ///
    /// # Errors
    ///
    /// Returns the first construction error encountered.
    ///
    /// # Examples
    ///
    /// ```
    /// use tardis_config::Configuration;
    ///
    /// let doc: serde_yaml::Mapping =
    ///     serde_yaml::from_str("supernova:\n  time_explosion: 13 day\n").unwrap();
    /// let config = Configuration::from_config_dict(doc, false, "").unwrap();
    ///
    /// // no schema ran, so the value is still the raw string
    /// assert_eq!(
    ///     config.get("supernova.time_explosion").unwrap().as_str(),
    ///     Some("13 day")
    /// );
    /// ```
    pub fn from_config_dict(
        document: Mapping,
        validate: bool,
        config_dirname: impl Into<PathBuf>,
    ) -> Result<Self> {
        let builder =
            ConfigurationBuilder::from_document(document).with_config_dirname(config_dirname);
        if validate {
            builder.build()
        } else {
            builder.skip_validation().build()
        }
    }

    /// Check the `tardis_config_version` marker of a raw document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VersionUnsupported`] if the marker is absent or is
    /// not [`TARDIS_CONFIG_VERSION`].
    pub fn check_version(document: &Mapping) -> Result<()> {
        match document.get(VERSION_KEY) {
            Some(YamlValue::String(version)) if version == TARDIS_CONFIG_VERSION => Ok(()),
            None | Some(YamlValue::Null) => Err(Error::VersionUnsupported { found: None }),
            Some(other) => Err(Error::VersionUnsupported {
                found: scalar_key(other),
            }),
        }
    }

    /// Returns the root namespace.
    #[must_use]
    pub const fn namespace(&self) -> &Namespace {
        &self.root
    }

    /// Returns the directory relative references are resolved against.
    #[must_use]
    pub fn config_dirname(&self) -> &Path {
        &self.config_dirname
    }

    /// Consumes the configuration, returning its root namespace.
    #[must_use]
    pub fn into_namespace(self) -> Namespace {
        self.root
    }

    /// Renders the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the YAML emitter fails.
    pub fn to_yaml_string(&self) -> Result<String> {
        self.root.to_yaml_string()
    }

    /// Renders the configuration as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if a value cannot be represented in JSON.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        self.root.to_json()
    }
}

impl Deref for Configuration {
    type Target = Namespace;

    fn deref(&self) -> &Namespace {
        &self.root
    }
}

impl DerefMut for Configuration {
    fn deref_mut(&mut self) -> &mut Namespace {
        &mut self.root
    }
}

enum Source {
    Document(Mapping),
    File(PathBuf),
}

/// Builder for [`Configuration`].
///
/// # Examples
///
/// ```
/// use tardis_config::config::ConfigurationBuilder;
///
/// let doc: serde_yaml::Mapping = serde_yaml::from_str(
///     "tardis_config_version: v1.0\n\
///      montecarlo:\n  convergence_strategy:\n    type: damped\n    threshold: 0.05\n\
///      spectrum:\n  start: 500 Angstrom\n  stop: 20000 Angstrom\n",
/// ).unwrap();
///
/// let config = ConfigurationBuilder::from_document(doc)
///     .with_config_dirname("/data/runs")
///     .build()
///     .unwrap();
/// assert_eq!(config.config_dirname().to_str(), Some("/data/runs"));
/// ```
pub struct ConfigurationBuilder {
    source: Source,
    config_dirname: Option<PathBuf>,
    validate: bool,
    schema: Box<dyn SchemaValidator>,
    csvy_loader: Box<dyn CsvyLoader>,
}

impl ConfigurationBuilder {
    /// Starts from an in-memory document.
    #[must_use]
    pub fn from_document(document: Mapping) -> Self {
        Self::new(Source::Document(document))
    }

    /// Starts from a YAML file, loaded when [`build`](Self::build) runs.
    ///
    /// File sources always have their version marker checked, and default
    /// `config_dirname` to the file's parent directory.
    #[must_use]
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Source::File(path.into()))
    }

    fn new(source: Source) -> Self {
        Self {
            source,
            config_dirname: None,
            validate: true,
            schema: Box::new(UnitCoercingSchema::default()),
            csvy_loader: Box::new(CsvyFrontMatterLoader),
        }
    }

    /// Sets the directory relative references are resolved against.
    #[must_use]
    pub fn with_config_dirname(mut self, config_dirname: impl Into<PathBuf>) -> Self {
        self.config_dirname = Some(config_dirname.into());
        self
    }

    /// Skips schema coercion and the validation pipeline.
    ///
    /// For trusted, programmatically built documents.
    #[must_use]
    pub const fn skip_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    /// Replaces the default [`UnitCoercingSchema`].
    #[must_use]
    pub fn with_schema(mut self, schema: Box<dyn SchemaValidator>) -> Self {
        self.schema = schema;
        self
    }

    /// Replaces the default [`CsvyFrontMatterLoader`].
    #[must_use]
    pub fn with_csvy_loader(mut self, loader: Box<dyn CsvyLoader>) -> Self {
        self.csvy_loader = loader;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first error from loading, the version check, the schema,
    /// the mutual-exclusion rule, the validation pipeline or the CSVY
    /// loader.
    pub fn build(self) -> Result<Configuration> {
        let (document, from_file, file_dir) = match self.source {
            Source::Document(document) => (document, false, None),
            Source::File(ref path) => {
                let document = DocumentLoader::load_file(path)?;
                let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
                (document, true, Some(dir))
            }
        };
        let config_dirname = self.config_dirname.or(file_dir).unwrap_or_default();

        if self.validate || from_file {
            Configuration::check_version(&document)?;
        }

        let mut root = if self.validate {
            self.schema.validate(&document)?
        } else {
            Namespace::from(document)
        };
        ConfigValidator::check_mutual_exclusion(&root)?;

        root.write(
            "config_dirname",
            config_dirname.to_string_lossy().into_owned(),
        )?;

        if self.validate {
            ConfigValidator::validate(&mut root)?;
        }

        let csvy_model = match root.read("csvy_model") {
            Ok(Value::Null) | Err(_) => None,
            Ok(Value::String(path)) => Some(path.clone()),
            Ok(other) => {
                return Err(Error::Validation {
                    field: "csvy_model".into(),
                    message: format!("expected a path string, found a {}", other.type_name()),
                })
            }
        };
        if let Some(csvy_model) = csvy_model {
            let model = synthesize_model(
                &config_dirname.join(&csvy_model),
                self.csvy_loader.as_ref(),
                self.validate.then_some(self.schema.as_ref()),
            )?;
            root.write("model", model)?;
        }

        log::debug!("configuration built with {} top-level sections", root.len());
        Ok(Configuration {
            root,
            config_dirname,
        })
    }
}

impl fmt::Debug for ConfigurationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            Source::Document(document) => format!("document with {} keys", document.len()),
            Source::File(path) => path.display().to_string(),
        };
        f.debug_struct("ConfigurationBuilder")
            .field("source", &source)
            .field("config_dirname", &self.config_dirname)
            .field("validate", &self.validate)
            .finish_non_exhaustive()
    }
}

/// Builds the `model` section of a CSVY-backed configuration from the
/// boundary velocities in the CSVY header.
fn synthesize_model(
    path: &Path,
    loader: &dyn CsvyLoader,
    schema: Option<&dyn SchemaValidator>,
) -> Result<Namespace> {
    let header = loader.load(path)?;

    let boundaries: Mapping = CSVY_BOUNDARY_KEYS
        .iter()
        .filter_map(|&key| {
            header
                .get(key)
                .map(|value| (YamlValue::from(key), value.clone()))
        })
        .collect();

    if boundaries.is_empty() {
        log::warn!(
            "CSVY model {} declares neither v_inner_boundary nor v_outer_boundary",
            path.display()
        );
    }

    let model = match schema {
        Some(schema) => schema.validate(&boundaries)?,
        None => Namespace::from(boundaries),
    };
    log::debug!("synthesized model section from {}", path.display());
    Ok(model)
}
