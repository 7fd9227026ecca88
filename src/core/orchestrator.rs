//! Build orchestration
//!
//! Walks the catalog in declaration order. Each package goes through
//! source preparation, dependency validation, its build hook, output
//! materialization and finally a persisted checkpoint entry. Packages
//! already in the checkpoint are skipped, which makes a failed run
//! resumable by simply running again.

use std::collections::BTreeMap;

use crate::core::catalog::{Catalog, Package};
use crate::core::checkpoint::{CheckpointSet, CheckpointStore};
use crate::core::hooks::{DependencyInfo, HookContext, HookRegistry, HookSettings};
use crate::core::materialize::Materializer;
use crate::core::source::SourceProvider;
use crate::error::{CatalogError, OrchestratorError};
use crate::infra::process::ProcessRunner;

/// Progress notifications emitted during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// The run is starting; `pending` packages still need building
    Planned { total: usize, pending: usize },
    /// Package was already checkpointed
    Skipped { package: String },
    /// Package build started
    Started { package: String },
    /// Build hook is about to run
    HookStarted { package: String, hook: String },
    /// Package outputs are in place and checkpointed
    Completed { package: String, actions: usize },
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Packages built in this run
    pub built: Vec<String>,
    /// Packages skipped because they were already checkpointed
    pub skipped: Vec<String>,
}

type Observer<'a> = Box<dyn Fn(&BuildEvent) + 'a>;

/// Drives the per-package build loop
pub struct Orchestrator<'a> {
    catalog: &'a Catalog,
    hooks: &'a HookRegistry,
    sources: &'a dyn SourceProvider,
    store: &'a dyn CheckpointStore,
    runner: &'a dyn ProcessRunner,
    materializer: Materializer,
    settings: HookSettings,
    observer: Option<Observer<'a>>,
}

impl<'a> Orchestrator<'a> {
    /// Wire an orchestrator from its collaborators
    pub fn new(
        catalog: &'a Catalog,
        hooks: &'a HookRegistry,
        sources: &'a dyn SourceProvider,
        store: &'a dyn CheckpointStore,
        runner: &'a dyn ProcessRunner,
        materializer: Materializer,
        settings: HookSettings,
    ) -> Self {
        Self {
            catalog,
            hooks,
            sources,
            store,
            runner,
            materializer,
            settings,
            observer: None,
        }
    }

    /// Receive [`BuildEvent`]s
    #[must_use]
    pub fn on_event(mut self, observer: impl Fn(&BuildEvent) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    fn emit(&self, event: BuildEvent) {
        if let Some(ref observer) = self.observer {
            observer(&event);
        }
    }

    /// Build every package, or only those named in `only`
    pub fn run(&self, only: &[String]) -> Result<RunSummary, OrchestratorError> {
        self.hooks.check_catalog(self.catalog)?;
        for name in only {
            self.catalog.lookup(name)?;
        }

        let mut done = self.store.load()?;
        let selected: Vec<&Package> = self
            .catalog
            .ordered()
            .iter()
            .filter(|p| only.is_empty() || only.contains(&p.name))
            .collect();

        self.emit(BuildEvent::Planned {
            total: selected.len(),
            pending: selected.iter().filter(|p| !done.contains(&p.name)).count(),
        });

        let mut summary = RunSummary::default();
        for pkg in selected {
            if done.contains(&pkg.name) {
                tracing::debug!("{} already built, skipping", pkg.name);
                summary.skipped.push(pkg.name.clone());
                self.emit(BuildEvent::Skipped {
                    package: pkg.name.clone(),
                });
                continue;
            }

            let actions = self.build_package(pkg, &done)?;

            done.insert(&pkg.name);
            self.store.save(&done)?;

            tracing::info!("Built {}", pkg.name);
            summary.built.push(pkg.name.clone());
            self.emit(BuildEvent::Completed {
                package: pkg.name.clone(),
                actions,
            });
        }

        Ok(summary)
    }

    fn build_package(&self, pkg: &Package, done: &CheckpointSet) -> Result<usize, OrchestratorError> {
        self.emit(BuildEvent::Started {
            package: pkg.name.clone(),
        });

        let workspace = self
            .sources
            .prepare(pkg)
            .map_err(|source| OrchestratorError::Source {
                package: pkg.name.clone(),
                source,
            })?;

        let dependencies = self.resolve_dependencies(pkg, done)?;

        if let Some(ref hook_name) = pkg.hook {
            let hook = self
                .hooks
                .get(hook_name)
                .ok_or_else(|| CatalogError::UnknownHook {
                    package: pkg.name.clone(),
                    hook: hook_name.clone(),
                })?;

            self.emit(BuildEvent::HookStarted {
                package: pkg.name.clone(),
                hook: hook_name.clone(),
            });

            let ctx = HookContext {
                package: &pkg.name,
                workspace: &workspace,
                dependencies: &dependencies,
                settings: &self.settings,
                runner: self.runner,
            };
            hook.run(&ctx).map_err(|source| OrchestratorError::Hook {
                package: pkg.name.clone(),
                source,
            })?;
        }

        let materialize_err = |source| OrchestratorError::Materialize {
            package: pkg.name.clone(),
            source,
        };
        let actions = self
            .materializer
            .apply(&workspace, &pkg.outputs)
            .map_err(materialize_err)?;
        self.materializer
            .create_symlinks(&pkg.symlinks)
            .map_err(materialize_err)?;

        Ok(actions)
    }

    /// Map each declared dependency to its checkout; all must be checkpointed
    fn resolve_dependencies(
        &self,
        pkg: &Package,
        done: &CheckpointSet,
    ) -> Result<BTreeMap<String, DependencyInfo>, OrchestratorError> {
        let missing: Vec<String> = pkg
            .dependencies
            .iter()
            .filter(|d| !done.contains(d))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(OrchestratorError::DependenciesNotBuilt {
                package: pkg.name.clone(),
                missing,
            });
        }

        let mut resolved = BTreeMap::new();
        for dep in &pkg.dependencies {
            let dep_pkg = self.catalog.lookup(dep)?;
            resolved.insert(
                dep.clone(),
                DependencyInfo {
                    path: self.sources.source_path(dep_pkg),
                },
            );
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::OutputGroup;
    use crate::core::checkpoint::MemoryCheckpointStore;
    use crate::core::hooks::BuildHook;
    use crate::error::{HookError, MaterializeError, SourceError};
    use crate::infra::filesystem;
    use crate::infra::process::SystemRunner;
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Checkouts are plain directories under `root`
    struct FakeSources {
        root: PathBuf,
        prepared: RefCell<Vec<String>>,
    }

    impl FakeSources {
        fn new(root: &Path) -> Self {
            Self {
                root: root.to_path_buf(),
                prepared: RefCell::new(Vec::new()),
            }
        }
    }

    impl SourceProvider for FakeSources {
        fn prepare(&self, package: &Package) -> Result<PathBuf, SourceError> {
            let dir = self.source_path(package);
            filesystem::create_dir_all(&dir)?;
            self.prepared.borrow_mut().push(package.name.clone());
            Ok(dir)
        }

        fn source_path(&self, package: &Package) -> PathBuf {
            self.root.join(&package.name)
        }
    }

    fn hook_a(ctx: &HookContext<'_>) -> Result<(), HookError> {
        filesystem::write_file(&ctx.path("out/a.h"), "a")?;
        Ok(())
    }

    fn hook_b(ctx: &HookContext<'_>) -> Result<(), HookError> {
        let a = ctx.dependency("A")?;
        if !a.join("out/a.h").is_file() {
            return Err(HookError::Failed("A's checkout not handed over".to_string()));
        }
        filesystem::write_file(&ctx.path("gen/inc/sub/b.h"), &a.display().to_string())?;
        Ok(())
    }

    fn two_package_catalog() -> Catalog {
        Catalog::new(vec![
            Package::new("A")
                .with_hook("a")
                .with_output(OutputGroup::new("usr/include").files(["out/a.h"])),
            Package::new("B")
                .with_dependencies(["A"])
                .with_hook("b")
                .with_output(OutputGroup::new("usr/include").globs(["gen/inc/**/*.h"])),
        ])
        .unwrap()
    }

    fn registry() -> HookRegistry {
        HookRegistry::new().with("a", hook_a).with("b", hook_b)
    }

    fn settings(temp: &TempDir) -> HookSettings {
        HookSettings {
            sdk_version: "14.4".to_string(),
            reference_sdk: temp.path().join("ref"),
            patches_dir: temp.path().join("patches"),
        }
    }

    fn tree(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        walkdir::WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .map(|e| e.unwrap())
            .map(|e| {
                let content = if e.file_type().is_file() {
                    fs::read(e.path()).unwrap()
                } else {
                    Vec::new()
                };
                (e.path().to_path_buf(), content)
            })
            .collect()
    }

    #[test]
    fn test_end_to_end_and_resume() {
        let temp = TempDir::new().unwrap();
        let catalog = two_package_catalog();
        let hooks = registry();
        let sources = FakeSources::new(&temp.path().join("src"));
        let store = MemoryCheckpointStore::new();
        let sdk = temp.path().join("sdk");

        let orchestrator = Orchestrator::new(
            &catalog,
            &hooks,
            &sources,
            &store,
            &SystemRunner,
            Materializer::new(&sdk),
            settings(&temp),
        );

        let summary = orchestrator.run(&[]).unwrap();
        assert_eq!(summary.built, vec!["A", "B"]);
        assert!(sdk.join("usr/include/a.h").is_file());
        assert_eq!(
            fs::read_to_string(sdk.join("usr/include/sub/b.h")).unwrap(),
            temp.path().join("src/A").display().to_string()
        );
        assert_eq!(store.snapshot().names(), ["A", "B"]);
        assert_eq!(store.save_count(), 2);

        let before = tree(&sdk);
        let summary = orchestrator.run(&[]).unwrap();

        assert!(summary.built.is_empty());
        assert_eq!(summary.skipped, vec!["A", "B"]);
        assert_eq!(sources.prepared.borrow().len(), 2);
        assert_eq!(store.save_count(), 2);
        assert_eq!(tree(&sdk), before);
    }

    #[test]
    fn test_dependency_not_built_rejected() {
        let temp = TempDir::new().unwrap();
        let catalog = two_package_catalog();
        let hooks = registry();
        let sources = FakeSources::new(&temp.path().join("src"));
        let store = MemoryCheckpointStore::new();

        let orchestrator = Orchestrator::new(
            &catalog,
            &hooks,
            &sources,
            &store,
            &SystemRunner,
            Materializer::new(temp.path().join("sdk")),
            settings(&temp),
        );

        let err = orchestrator.run(&["B".to_string()]).unwrap_err();
        match err {
            OrchestratorError::DependenciesNotBuilt { package, missing } => {
                assert_eq!(package, "B");
                assert_eq!(missing, vec!["A"]);
            }
            other => panic!("Expected ordering error, got {other:?}"),
        }
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_only_builds_selected_after_dependencies() {
        let temp = TempDir::new().unwrap();
        let catalog = two_package_catalog();
        let hooks = registry();
        let sources = FakeSources::new(&temp.path().join("src"));
        let store = MemoryCheckpointStore::new();
        let orchestrator = Orchestrator::new(
            &catalog,
            &hooks,
            &sources,
            &store,
            &SystemRunner,
            Materializer::new(temp.path().join("sdk")),
            settings(&temp),
        );

        orchestrator.run(&["A".to_string()]).unwrap();
        assert_eq!(store.snapshot().names(), ["A"]);

        let summary = orchestrator.run(&["B".to_string()]).unwrap();
        assert_eq!(summary.built, vec!["B"]);
    }

    #[test]
    fn test_unknown_selection_rejected() {
        let temp = TempDir::new().unwrap();
        let catalog = two_package_catalog();
        let hooks = registry();
        let sources = FakeSources::new(temp.path());
        let store = MemoryCheckpointStore::new();
        let orchestrator = Orchestrator::new(
            &catalog,
            &hooks,
            &sources,
            &store,
            &SystemRunner,
            Materializer::new(temp.path().join("sdk")),
            settings(&temp),
        );

        let err = orchestrator.run(&["Z".to_string()]).unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::Catalog(CatalogError::UnknownPackage { .. })
        ));
    }

    #[test]
    fn test_failure_keeps_earlier_checkpoints() {
        let temp = TempDir::new().unwrap();
        let catalog = two_package_catalog();
        let failing = |_: &HookContext<'_>| -> Result<(), HookError> {
            Err(HookError::Failed("make exited 2".to_string()))
        };
        let hooks = HookRegistry::new().with("a", hook_a).with("b", failing);
        let sources = FakeSources::new(&temp.path().join("src"));
        let store = MemoryCheckpointStore::new();
        let orchestrator = Orchestrator::new(
            &catalog,
            &hooks,
            &sources,
            &store,
            &SystemRunner,
            Materializer::new(temp.path().join("sdk")),
            settings(&temp),
        );

        let err = orchestrator.run(&[]).unwrap_err();
        assert!(matches!(err, OrchestratorError::Hook { ref package, .. } if package == "B"));
        assert_eq!(store.snapshot().names(), ["A"]);
    }

    #[test]
    fn test_missing_output_aborts_without_checkpoint() {
        let temp = TempDir::new().unwrap();
        let catalog = Catalog::new(vec![Package::new("A")
            .with_output(OutputGroup::new("usr/include").files(["never-built.h"]))])
        .unwrap();
        let hooks = HookRegistry::new();
        let sources = FakeSources::new(&temp.path().join("src"));
        let store = MemoryCheckpointStore::new();
        let orchestrator = Orchestrator::new(
            &catalog,
            &hooks,
            &sources,
            &store,
            &SystemRunner,
            Materializer::new(temp.path().join("sdk")),
            settings(&temp),
        );

        let err = orchestrator.run(&[]).unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::Materialize {
                source: MaterializeError::MissingFile { .. },
                ..
            }
        ));
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_events_emitted_in_order() {
        let temp = TempDir::new().unwrap();
        let catalog = two_package_catalog();
        let hooks = registry();
        let sources = FakeSources::new(&temp.path().join("src"));
        let store = MemoryCheckpointStore::with_set(["A"].into_iter().collect());
        let events = RefCell::new(Vec::new());

        let orchestrator = Orchestrator::new(
            &catalog,
            &hooks,
            &sources,
            &store,
            &SystemRunner,
            Materializer::new(temp.path().join("sdk")),
            settings(&temp),
        )
        .on_event(|e| events.borrow_mut().push(e.clone()));

        // A is skipped, but B still needs A's checkout to exist
        sources.prepare(&Package::new("A")).unwrap();
        hook_a(&HookContext {
            package: "A",
            workspace: &temp.path().join("src/A"),
            dependencies: &BTreeMap::new(),
            settings: &settings(&temp),
            runner: &SystemRunner,
        })
        .unwrap();

        orchestrator.run(&[]).unwrap();

        let events = events.borrow();
        assert_eq!(events[0], BuildEvent::Planned { total: 2, pending: 1 });
        assert_eq!(
            events[1],
            BuildEvent::Skipped {
                package: "A".to_string()
            }
        );
        assert!(matches!(events[2], BuildEvent::Started { ref package } if package == "B"));
        assert!(matches!(events[3], BuildEvent::HookStarted { ref hook, .. } if hook == "b"));
        assert!(matches!(events[4], BuildEvent::Completed { ref package, .. } if package == "B"));
    }

    #[test]
    fn test_hook_trait_object_usable() {
        let hooks = registry();
        assert!(hooks.get("a").is_some());
        let _: &dyn BuildHook = hooks.get("b").unwrap();
    }
}
