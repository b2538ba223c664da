use std::path::PathBuf;

use depsync_core::artifact::{Artifact, ArtifactCategory};
use depsync_core::coordinate::ModuleRevisionId;
use depsync_core::scope::DependencyScope;
use depsync_model::library_cache::library_name;
use depsync_model::local::LocalProjectModel;
use depsync_model::store::ProjectModelStore;
use depsync_model::transaction::ModelTransaction;
use depsync_model::wrapper::{ModelAction, ProjectModelWrapper};
use depsync_resolver::dependency::{ExternalDependency, InternalDependency, ResolvedDependency};
use depsync_util::errors::DepsyncError;

fn external(
    name: &str,
    rev: &str,
    category: ArtifactCategory,
    scope: Option<DependencyScope>,
) -> ResolvedDependency {
    let id = ModuleRevisionId::new("org.example", name, rev);
    let artifact_type = match category {
        ArtifactCategory::Classes => "jar",
        ArtifactCategory::Sources => "source",
        ArtifactCategory::Javadoc => "javadoc",
    };
    let artifact = Artifact::new(id, name, artifact_type, "jar");
    let file = PathBuf::from(format!("/cache/{name}-{rev}-{category}.jar"));
    ExternalDependency::new(artifact, file, category, scope).into()
}

fn internal(module: &str, scope: DependencyScope) -> ResolvedDependency {
    InternalDependency::new(module, scope).into()
}

fn lib(name: &str, rev: &str) -> String {
    library_name(&format!("org.example:{name}:{rev}"))
}

#[test]
fn second_reconcile_changes_nothing() {
    let store = LocalProjectModel::in_memory();
    let wrapper = ProjectModelWrapper::new(&store, "app");
    let deps = vec![
        external("lib", "1.0", ArtifactCategory::Classes, Some(DependencyScope::Compile)),
        external("lib", "1.0", ArtifactCategory::Sources, None),
        internal("core", DependencyScope::Runtime),
    ];

    let first = wrapper.reconcile(&deps).unwrap();
    assert!(first.committed);
    assert_eq!(store.commit_count(), 1);

    let second = wrapper.reconcile(&deps).unwrap();
    assert!(!second.committed);
    assert!(second.actions.is_empty());
    assert_eq!(store.commit_count(), 1);

    let model = store.module("app");
    let library = &model.libraries[&lib("lib", "1.0")];
    assert_eq!(library.scope, DependencyScope::Compile);
    assert_eq!(library.roots.len(), 2);
    assert_eq!(model.modules.get("core"), Some(&DependencyScope::Runtime));
}

#[test]
fn one_library_per_module_revision() {
    let store = LocalProjectModel::in_memory();
    let wrapper = ProjectModelWrapper::new(&store, "app");
    let deps = vec![
        external("lib", "1.0", ArtifactCategory::Classes, Some(DependencyScope::Compile)),
        external("lib", "1.0", ArtifactCategory::Javadoc, None),
        external("lib", "1.0", ArtifactCategory::Sources, None),
        external("other", "2.0", ArtifactCategory::Classes, Some(DependencyScope::Test)),
    ];
    let outcome = wrapper.reconcile(&deps).unwrap();
    let creates = outcome
        .actions
        .iter()
        .filter(|a| matches!(a, ModelAction::CreateLibrary { .. }))
        .count();
    assert_eq!(creates, 2);
    assert_eq!(store.module("app").libraries.len(), 2);
}

#[test]
fn stale_entries_are_removed_and_unmanaged_ones_kept() {
    let store = LocalProjectModel::in_memory();
    {
        let mut tx = ModelTransaction::begin(&store, "app").unwrap();
        let model = tx.model_mut();
        model
            .create_library("hand-made", DependencyScope::Provided)
            .unwrap();
        model
            .add_root(
                "hand-made",
                ArtifactCategory::Classes,
                PathBuf::from("/opt/tools.jar").as_path(),
            )
            .unwrap();
        assert!(tx.finish().unwrap());
    }

    let wrapper = ProjectModelWrapper::new(&store, "app");
    wrapper
        .reconcile(&[
            external("lib", "1.0", ArtifactCategory::Classes, Some(DependencyScope::Compile)),
            external("lib", "1.0", ArtifactCategory::Sources, None),
            external("old", "0.9", ArtifactCategory::Classes, Some(DependencyScope::Compile)),
            internal("core", DependencyScope::Compile),
        ])
        .unwrap();

    let outcome = wrapper
        .reconcile(&[external(
            "lib",
            "1.0",
            ArtifactCategory::Classes,
            Some(DependencyScope::Test),
        )])
        .unwrap();
    assert!(outcome.committed);
    assert!(outcome.actions.contains(&ModelAction::RemoveLibrary {
        name: lib("old", "0.9")
    }));
    assert!(outcome.actions.contains(&ModelAction::RemoveModuleEntry {
        module: "core".into()
    }));

    let model = store.module("app");
    let names: Vec<&String> = model.libraries.keys().collect();
    assert_eq!(names, vec![&lib("lib", "1.0"), &"hand-made".to_string()]);
    let kept = &model.libraries[&lib("lib", "1.0")];
    assert_eq!(kept.scope, DependencyScope::Test);
    assert!(!kept.roots.contains_key(&ArtifactCategory::Sources));
    assert!(model.modules.is_empty());
}

#[test]
fn absent_scope_leaves_existing_scope() {
    let store = LocalProjectModel::in_memory();
    let wrapper = ProjectModelWrapper::new(&store, "app");
    wrapper
        .reconcile(&[
            external("lib", "1.0", ArtifactCategory::Classes, Some(DependencyScope::Runtime)),
            external("lib", "1.0", ArtifactCategory::Sources, None),
        ])
        .unwrap();
    let outcome = wrapper
        .reconcile(&[
            external("lib", "1.0", ArtifactCategory::Sources, None),
            external("lib", "1.0", ArtifactCategory::Classes, Some(DependencyScope::Runtime)),
        ])
        .unwrap();
    assert!(outcome.actions.is_empty());
    assert_eq!(
        store.module("app").libraries[&lib("lib", "1.0")].scope,
        DependencyScope::Runtime
    );
}

#[test]
fn module_entry_scope_is_updated() {
    let store = LocalProjectModel::in_memory();
    let wrapper = ProjectModelWrapper::new(&store, "app");
    wrapper
        .reconcile(&[internal("core", DependencyScope::Compile)])
        .unwrap();
    let outcome = wrapper
        .reconcile(&[internal("core", DependencyScope::Test)])
        .unwrap();
    assert_eq!(
        outcome.actions,
        vec![ModelAction::SetModuleScope {
            module: "core".into(),
            scope: DependencyScope::Test
        }]
    );
    assert_eq!(
        store.module("app").modules.get("core"),
        Some(&DependencyScope::Test)
    );
}

#[test]
fn failed_apply_leaves_committed_state() {
    let store = LocalProjectModel::in_memory();
    let wrapper = ProjectModelWrapper::new(&store, "app");
    wrapper
        .reconcile(&[external(
            "lib",
            "1.0",
            ArtifactCategory::Classes,
            Some(DependencyScope::Compile),
        )])
        .unwrap();

    // a module cannot depend on itself
    let err = wrapper
        .reconcile(&[internal("app", DependencyScope::Compile)])
        .unwrap_err();
    assert!(matches!(err, DepsyncError::Model { .. }));
    assert_eq!(store.commit_count(), 1);
    assert_eq!(store.module("app").libraries.len(), 1);
    assert!(store.modifiable_model("app").is_ok());
}

#[test]
fn remove_managed_libraries_only() {
    let store = LocalProjectModel::in_memory();
    {
        let mut tx = ModelTransaction::begin(&store, "app").unwrap();
        tx.model_mut()
            .create_library("hand-made", DependencyScope::Compile)
            .unwrap();
        tx.finish().unwrap();
    }
    let wrapper = ProjectModelWrapper::new(&store, "app");
    wrapper
        .reconcile(&[
            external("lib", "1.0", ArtifactCategory::Classes, Some(DependencyScope::Compile)),
            internal("core", DependencyScope::Compile),
        ])
        .unwrap();

    let outcome = wrapper.remove_managed_libraries().unwrap();
    assert_eq!(outcome.actions.len(), 1);
    let model = store.module("app");
    assert_eq!(model.libraries.len(), 1);
    assert!(model.libraries.contains_key("hand-made"));
    assert_eq!(model.modules.len(), 1);

    let again = wrapper.remove_managed_libraries().unwrap();
    assert!(!again.committed);
}

#[test]
fn committed_model_survives_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    {
        let store = LocalProjectModel::for_project(tmp.path()).unwrap();
        ProjectModelWrapper::new(&store, "app")
            .reconcile(&[external(
                "lib",
                "1.0",
                ArtifactCategory::Classes,
                Some(DependencyScope::Provided),
            )])
            .unwrap();
    }
    assert!(tmp.path().join(".depsync/model.json").is_file());

    let reopened = LocalProjectModel::for_project(tmp.path()).unwrap();
    assert_eq!(reopened.module_names(), vec!["app"]);
    assert_eq!(
        reopened.module("app").libraries[&lib("lib", "1.0")].scope,
        DependencyScope::Provided
    );
    let outcome = ProjectModelWrapper::new(&reopened, "app")
        .reconcile(&[external(
            "lib",
            "1.0",
            ArtifactCategory::Classes,
            Some(DependencyScope::Provided),
        )])
        .unwrap();
    assert!(!outcome.committed);
}

#[test]
fn corrupt_model_file_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("model.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = LocalProjectModel::open(&path).unwrap_err();
    assert!(matches!(err, DepsyncError::Model { .. }));
}
