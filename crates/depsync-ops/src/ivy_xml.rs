//! Minimal readers for Ivy module descriptors and settings files.
//!
//! Only the parts resolution orchestration needs are read: the module
//! identity, its configurations, and the cache location and properties of a
//! settings file.

use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use depsync_core::configuration::Configuration;
use depsync_core::coordinate::ModuleRevisionId;
use depsync_core::properties::interpolate;
use depsync_core::report::ModuleDescriptor;

/// Revision used when a descriptor declares none.
pub const DEFAULT_REVISION: &str = "working";

/// Parse an `ivy.xml` body, expanding `${name}` references in attribute
/// values with `properties`.
pub fn parse_module_descriptor(
    xml: &str,
    properties: &BTreeMap<String, String>,
) -> Result<ModuleDescriptor, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut id: Option<ModuleRevisionId> = None;
    let mut configurations: Vec<Configuration> = Vec::new();

    loop {
        let (e, empty) = match reader.read_event() {
            Ok(Event::Start(e)) => (e, false),
            Ok(Event::Empty(e)) => (e, true),
            Ok(Event::End(_)) => {
                path.pop();
                continue;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "error at position {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => continue,
        };

        let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
        let ctx = if path.is_empty() {
            tag.clone()
        } else {
            format!("{}>{tag}", path.join(">"))
        };

        match ctx.as_str() {
            "ivy-module>info" => {
                let organisation = attr(&e, "organisation", properties)
                    .ok_or("<info> has no organisation attribute")?;
                let module =
                    attr(&e, "module", properties).ok_or("<info> has no module attribute")?;
                let revision = attr(&e, "revision", properties)
                    .unwrap_or_else(|| DEFAULT_REVISION.to_string());
                id = Some(ModuleRevisionId::new(organisation, module, revision));
            }
            "ivy-module>configurations>conf" => {
                let name = attr(&e, "name", properties).ok_or("<conf> has no name attribute")?;
                let extends = attr(&e, "extends", properties)
                    .map(|s| split_list(&s))
                    .unwrap_or_default();
                let mut conf = Configuration::new(name).extending(extends);
                conf.description = attr(&e, "description", properties);
                conf.deprecated = attr(&e, "deprecated", properties);
                configurations.push(conf);
            }
            _ => {}
        }

        if !empty {
            path.push(tag);
        }
    }

    let id = id.ok_or("descriptor has no <info> element")?;
    expand_wildcards(&mut configurations);
    Ok(ModuleDescriptor { id, configurations })
}

/// `extends="*"` (optionally with a visibility filter) means every other
/// configuration.
fn expand_wildcards(configurations: &mut [Configuration]) {
    let names: Vec<String> = configurations.iter().map(|c| c.name.clone()).collect();
    for conf in configurations.iter_mut() {
        if !conf.extends.iter().any(|e| e.starts_with('*')) {
            continue;
        }
        let own = conf.name.clone();
        conf.extends = names.iter().filter(|n| **n != own).cloned().collect();
    }
}

/// What a settings file contributes to engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsFile {
    pub default_cache_dir: Option<String>,
    pub properties: BTreeMap<String, String>,
}

/// Parse an `ivysettings.xml` body.
///
/// `<property name value/>` entries are collected, and the cache directory
/// is expanded with them on top of `properties`. Externally supplied
/// properties take precedence over those declared in the file.
pub fn parse_settings(
    xml: &str,
    properties: &BTreeMap<String, String>,
) -> Result<SettingsFile, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut merged = properties.clone();
    let mut declared = BTreeMap::new();
    let mut cache_dir: Option<String> = None;

    loop {
        let e = match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => e,
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "error at position {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => continue,
        };
        match e.name().as_ref() {
            b"property" => {
                if let (Some(name), Some(value)) =
                    (attr(&e, "name", &merged), attr(&e, "value", &merged))
                {
                    declared.insert(name.clone(), value.clone());
                    merged.entry(name).or_insert(value);
                }
            }
            b"caches" => cache_dir = raw_attr(&e, "defaultCacheDir"),
            _ => {}
        }
    }

    Ok(SettingsFile {
        default_cache_dir: cache_dir.map(|dir| interpolate(&dir, &merged)),
        properties: declared,
    })
}

fn raw_attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    let attribute = e.try_get_attribute(name).ok()??;
    let value = attribute.unescape_value().ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn attr(e: &BytesStart<'_>, name: &str, properties: &BTreeMap<String, String>) -> Option<String> {
    raw_attr(e, name).map(|v| interpolate(&v, properties))
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const IVY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ivy-module version="2.0">
    <info organisation="org.example" module="app" revision="${app.version}">
        <description>Example application</description>
    </info>
    <configurations>
        <conf name="compile" description="compile classpath"/>
        <conf name="runtime" extends="compile"/>
        <conf name="test" extends="runtime, compile" deprecated="use it"/>
        <conf name="all" extends="*"/>
    </configurations>
    <dependencies>
        <dependency org="junit" name="junit" rev="4.13" conf="test->default"/>
    </dependencies>
</ivy-module>"#;

    #[test]
    fn reads_info_and_configurations() {
        let mut props = BTreeMap::new();
        props.insert("app.version".to_string(), "2.1".to_string());
        let d = parse_module_descriptor(IVY, &props).unwrap();
        assert_eq!(d.id, ModuleRevisionId::new("org.example", "app", "2.1"));
        let names: Vec<&str> = d.configurations.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["compile", "runtime", "test", "all"]);
        assert_eq!(d.configurations[2].extends, ["runtime", "compile"]);
        assert!(d.configurations[2].is_deprecated());
        assert_eq!(
            d.configurations[0].description.as_deref(),
            Some("compile classpath")
        );
        assert_eq!(d.configurations[3].extends, ["compile", "runtime", "test"]);
    }

    #[test]
    fn missing_revision_defaults() {
        let xml = r#"<ivy-module version="2.0"><info organisation="o" module="m"/></ivy-module>"#;
        let d = parse_module_descriptor(xml, &BTreeMap::new()).unwrap();
        assert_eq!(d.id.revision, DEFAULT_REVISION);
        assert!(d.configurations.is_empty());
    }

    #[test]
    fn missing_info_is_an_error() {
        let err = parse_module_descriptor("<ivy-module/>", &BTreeMap::new()).unwrap_err();
        assert!(err.contains("<info>"));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(parse_module_descriptor("<ivy-module><info", &BTreeMap::new()).is_err());
    }

    #[test]
    fn settings_cache_dir_uses_properties() {
        let xml = r#"<ivysettings>
            <property name="repo.root" value="/srv/ivy"/>
            <property name="cache.name" value="from-file"/>
            <caches defaultCacheDir="${repo.root}/${cache.name}"/>
        </ivysettings>"#;
        let mut props = BTreeMap::new();
        props.insert("cache.name".to_string(), "from-props".to_string());
        let settings = parse_settings(xml, &props).unwrap();
        assert_eq!(
            settings.default_cache_dir.as_deref(),
            Some("/srv/ivy/from-props")
        );
        assert_eq!(settings.properties.len(), 2);
    }
}
