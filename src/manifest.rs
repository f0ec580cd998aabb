//! Umbrella manifest reader
//!
//! The umbrella repository carries a repo-style XML manifest that pins every
//! component to a commit:
//!
//! ```xml
//! <manifest>
//!   <remote name="origin" fetch="https://github.com/GPUOpen-Drivers/"/>
//!   <project name="xgl" path="drivers/xgl" revision="7d4a..." remote="origin"/>
//!   <project revision="abc123" name="llvm-project" path="drivers/llvm-project"/>
//! </manifest>
//! ```
//!
//! Any element carrying both `name` and `revision` is a record; attribute
//! order does not matter. When a component appears twice the first record
//! wins.

use crate::core::error::{ManifestError, ReleaseResult, ResultExt};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs;
use std::path::Path;

/// One `name` + `revision` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
  pub name: String,
  pub revision: String,
}

impl ManifestRecord {
  /// Component a record refers to: the last path segment of `name`
  pub fn component(&self) -> &str {
    self.name.rsplit('/').next().unwrap_or(&self.name)
  }
}

#[derive(Debug, Clone, Default)]
pub struct Manifest {
  records: Vec<ManifestRecord>,
}

/// Revision resolved for one component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedRevision {
  pub component: String,
  pub revision: String,
}

impl Manifest {
  /// Read `<umbrella_dir>/<file_name>`
  pub fn load(umbrella_dir: &Path, file_name: &str) -> ReleaseResult<Self> {
    let path = umbrella_dir.join(file_name);
    if !path.exists() {
      return Err(ManifestError::NotFound { path }.into());
    }
    let content =
      fs::read_to_string(&path).with_context(|| format!("Failed to read manifest {}", path.display()))?;
    Self::parse(&content)
  }

  pub fn parse(xml: &str) -> ReleaseResult<Self> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    loop {
      match reader.read_event() {
        Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
          if let Some(record) = record_from(&reader, &element)? {
            records.push(record);
          }
        }
        Ok(Event::Eof) => break,
        Ok(_) => {}
        Err(e) => {
          return Err(
            ManifestError::Malformed {
              reason: format!("at byte {}: {}", reader.error_position(), e),
            }
            .into(),
          );
        }
      }
    }

    tracing::debug!(records = records.len(), "parsed manifest");
    Ok(Self { records })
  }

  pub fn records(&self) -> &[ManifestRecord] {
    &self.records
  }

  /// Revision of the first record for `component`
  pub fn revision_of(&self, component: &str) -> Option<&str> {
    self
      .records
      .iter()
      .find(|r| r.component() == component)
      .map(|r| r.revision.as_str())
  }

  /// Resolve every component, in the order given
  ///
  /// A component without a record, or whose record has an empty revision, is
  /// `ManifestError::MissingRevision`.
  pub fn resolve<S: AsRef<str>>(&self, components: &[S]) -> ReleaseResult<Vec<PinnedRevision>> {
    components
      .iter()
      .map(|component| {
        let component = component.as_ref();
        match self.revision_of(component) {
          Some(revision) if !revision.trim().is_empty() => Ok(PinnedRevision {
            component: component.to_string(),
            revision: revision.trim().to_string(),
          }),
          _ => Err(
            ManifestError::MissingRevision {
              component: component.to_string(),
            }
            .into(),
          ),
        }
      })
      .collect()
  }
}

fn record_from(reader: &Reader<&[u8]>, element: &BytesStart<'_>) -> ReleaseResult<Option<ManifestRecord>> {
  let mut name = None;
  let mut revision = None;

  for attr in element.attributes() {
    let attr = attr.map_err(|e| ManifestError::Malformed {
      reason: format!("bad attribute: {}", e),
    })?;
    let value = || {
      attr
        .decode_and_unescape_value(reader.decoder())
        .map(|v| v.to_string())
        .map_err(|e| ManifestError::Malformed {
          reason: format!("bad attribute value: {}", e),
        })
    };
    match attr.key.as_ref() {
      b"name" => name = Some(value()?),
      b"revision" => revision = Some(value()?),
      _ => {}
    }
  }

  Ok(match (name, revision) {
    (Some(name), Some(revision)) => Some(ManifestRecord { name, revision }),
    _ => None,
  })
}
