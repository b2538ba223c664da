use depsync_core::project::ProjectConfig;
use depsync_core::scope::DependencyScope;

#[test]
fn parse_minimal_project() {
    let config = ProjectConfig::from_str(
        r#"
[[module]]
name = "app"
"#,
    )
    .unwrap();
    assert_eq!(config.modules.len(), 1);
    let app = &config.modules[0];
    assert_eq!(app.dir, ".");
    assert_eq!(app.manifest, "ivy.xml");
    assert!(app.use_project_settings);
    assert!(app.include_project_properties);
    assert!(!config.use_global_settings);
    assert!(config.settings.transitive);
    assert!(config.settings.detect_internal_modules);
    assert!(!config.settings.detect_internal_modules_same_revision);
}

#[test]
fn parse_full_settings() {
    let config = ProjectConfig::from_str(
        r#"
[settings]
validate = true
transitive = false
cache-only = true
always-attach-sources = false
always-attach-javadocs = false
detect-internal-modules-same-revision = true
resolve-only-configs = ["default", "test"]

[settings.scopes]
test = "test"
runtime = "runtime"

[settings.artifact-types]
classes = ["jar", "bundle"]
sources = ["source"]
javadoc = ["javadoc"]

[[module]]
name = "core"
dir = "modules/core"
organisation = "com.acme"
only-resolve-selected-configs = true
configs-to-resolve = ["default"]

[module.scopes]
provided = "provided"
"#,
    )
    .unwrap();

    let s = &config.settings;
    assert!(s.validate);
    assert!(!s.transitive);
    assert!(s.cache_only);
    assert!(!s.always_attach_sources);
    assert!(s.detect_internal_modules_same_revision);
    assert_eq!(s.resolve_only_configs.len(), 2);
    assert_eq!(s.scopes.get("test"), Some(&DependencyScope::Test));
    assert_eq!(s.artifact_types.classes.len(), 2);

    let core = &config.modules[0];
    assert_eq!(core.dir, "modules/core");
    assert_eq!(core.organisation.as_deref(), Some("com.acme"));
    assert!(core.only_resolve_selected_configs);
    assert_eq!(core.scopes.get("provided"), Some(&DependencyScope::Provided));
}

#[test]
fn invalid_scope_is_a_config_error() {
    let err = ProjectConfig::from_str(
        r#"
[settings.scopes]
test = "everywhere"
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("Configuration error"), "got: {err}");
}
