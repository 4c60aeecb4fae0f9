use std::collections::BTreeMap;

use serde::Serialize;

/// Core metadata fields read from an artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    pub metadata_version: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub summary: Option<String>,
    /// Long description, from the message body or the `Description` header.
    pub description: Option<String>,
    pub description_content_type: Option<String>,
    pub home_page: Option<String>,
    pub download_url: Option<String>,
    pub author: Option<String>,
    pub author_email: Option<String>,
    pub maintainer: Option<String>,
    pub maintainer_email: Option<String>,
    pub license: Option<String>,
    pub license_expression: Option<String>,
    pub keywords: Option<String>,
    pub requires_python: Option<String>,
    pub classifiers: Vec<String>,
    pub platforms: Vec<String>,
    pub supported_platforms: Vec<String>,
    pub requires_dist: Vec<String>,
    pub provides_dist: Vec<String>,
    pub obsoletes_dist: Vec<String>,
    pub requires_external: Vec<String>,
    pub project_urls: Vec<String>,
    pub provides_extras: Vec<String>,
    pub license_files: Vec<String>,
    pub dynamic: Vec<String>,
}

/// A value in the metadata dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(Option<String>),
    List(Vec<String>),
}

impl MetadataValue {
    /// The text of a single-valued field, if set.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => value.as_deref(),
            Self::List(_) => None,
        }
    }
}

impl From<Option<String>> for MetadataValue {
    fn from(value: Option<String>) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(Some(value.to_string()))
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Field name to value, using the upload form's field names.
pub type MetadataDictionary = BTreeMap<String, MetadataValue>;

impl PackageMetadata {
    /// Flatten into the dictionary an index upload form expects.
    pub fn to_dictionary(&self) -> MetadataDictionary {
        let text: [(&str, &Option<String>); 16] = [
            ("metadata_version", &self.metadata_version),
            ("name", &self.name),
            ("version", &self.version),
            ("summary", &self.summary),
            ("description", &self.description),
            ("description_content_type", &self.description_content_type),
            ("home_page", &self.home_page),
            ("download_url", &self.download_url),
            ("author", &self.author),
            ("author_email", &self.author_email),
            ("maintainer", &self.maintainer),
            ("maintainer_email", &self.maintainer_email),
            ("license", &self.license),
            ("license_expression", &self.license_expression),
            ("keywords", &self.keywords),
            ("requires_python", &self.requires_python),
        ];
        let lists: [(&str, &Vec<String>); 11] = [
            ("classifiers", &self.classifiers),
            ("platform", &self.platforms),
            ("supported_platform", &self.supported_platforms),
            ("requires_dist", &self.requires_dist),
            ("provides_dist", &self.provides_dist),
            ("obsoletes_dist", &self.obsoletes_dist),
            ("requires_external", &self.requires_external),
            ("project_urls", &self.project_urls),
            ("provides_extras", &self.provides_extras),
            ("license_files", &self.license_files),
            ("dynamic", &self.dynamic),
        ];

        let mut dict = MetadataDictionary::new();
        for (key, value) in text {
            dict.insert(key.to_string(), MetadataValue::Text(value.clone()));
        }
        for (key, value) in lists {
            dict.insert(key.to_string(), MetadataValue::List(value.clone()));
        }
        dict
    }
}
