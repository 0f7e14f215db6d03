// Integration tests for the Core lifecycle and dispatch through the library API

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

use bootcore::command::{CommandUnit, EntryPoint, UnitInfo, UnitRegistry};
use bootcore::environment::RuntimeInfo;
use bootcore::{bootstrap, Core, CoreError, CoreOptions, LifecycleState, ResolutionError};

// Every call to a recording entry point, tagged by its first argument so
// tests running in parallel can pick out their own calls.
static CALLS: Mutex<Vec<Vec<String>>> = Mutex::new(Vec::new());

fn calls_tagged(tag: &str) -> Vec<Vec<String>> {
    CALLS
        .lock()
        .unwrap()
        .iter()
        .filter(|args| args.first().map(String::as_str) == Some(tag))
        .cloned()
        .collect()
}

struct RecordUnit {
    info: UnitInfo,
}

impl RecordUnit {
    fn new() -> Self {
        Self { info: UnitInfo::new("record", "0.1.0", "Record the arguments") }
    }

    fn main(args: &[String]) -> anyhow::Result<()> {
        CALLS.lock().unwrap().push(args.to_vec());
        Ok(())
    }

    fn fail(args: &[String]) -> anyhow::Result<()> {
        CALLS.lock().unwrap().push(args.to_vec());
        anyhow::bail!("record refused {} argument(s)", args.len())
    }
}

impl CommandUnit for RecordUnit {
    fn unit_info(&self) -> &UnitInfo {
        &self.info
    }

    fn entry_point(&self, name: &str) -> Option<EntryPoint> {
        match name {
            "main" => Some(Self::main),
            "fail" => Some(Self::fail),
            _ => None,
        }
    }
}

/// A unit without the designated `main` entry point
struct HollowUnit {
    info: UnitInfo,
}

impl CommandUnit for HollowUnit {
    fn unit_info(&self) -> &UnitInfo {
        &self.info
    }

    fn entry_point(&self, _name: &str) -> Option<EntryPoint> {
        None
    }
}

fn registry() -> UnitRegistry {
    let mut registry = UnitRegistry::new();
    registry.register(Box::new(RecordUnit::new())).unwrap();
    registry
        .register(Box::new(HollowUnit { info: UnitInfo::new("hollow", "0.1.0", "") }))
        .unwrap();
    registry
}

fn descriptor(root: &Path, file: &str, body: &str) {
    let commands = root.join("commands");
    fs::create_dir_all(&commands).unwrap();
    fs::write(commands.join(file), body).unwrap();
}

/// Root with record/hollow descriptors and `config` at data/config/core.toml
fn setup_root(config: &str) -> TempDir {
    let root = TempDir::new().expect("Failed to create temp directory");
    descriptor(root.path(), "record.toml", "[unit]\nname = \"record\"\n");
    descriptor(root.path(), "hollow.toml", "[unit]\nname = \"hollow\"\n");
    write_config(root.path(), config);
    root
}

fn config_path(root: &Path) -> std::path::PathBuf {
    root.join("data").join("config").join("core.toml")
}

fn write_config(root: &Path, config: &str) {
    let path = config_path(root);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, config).unwrap();
}

fn core_for(root: &Path) -> Core {
    let options = CoreOptions::new(root).with_config_file(config_path(root));
    Core::new(options, registry())
}

#[test]
fn test_bootstrap_dispatches_configured_command() {
    let root = setup_root("run = \"record t-success a b c\"\n");
    let mut core = core_for(root.path());

    bootstrap(&mut core).unwrap();

    assert_eq!(core.state(), LifecycleState::Success);
    assert_eq!(
        core.lifecycle().transitions(),
        &[
            (LifecycleState::Init, LifecycleState::Invoke),
            (LifecycleState::Invoke, LifecycleState::Success),
        ]
    );
    assert_eq!(calls_tagged("t-success"), vec![vec!["t-success", "a", "b", "c"]]);
    assert!(core.interceptor().is_installed());
}

#[test]
fn test_invoke_before_init_is_a_noop() {
    let root = setup_root("run = \"record t-early\"\n");
    let mut core = core_for(root.path());

    core.invoke().unwrap();

    assert_eq!(core.state(), LifecycleState::Init);
    assert!(core.lifecycle().transitions().is_empty());
    assert!(core.config().is_none());
    assert!(calls_tagged("t-early").is_empty());
}

#[test]
fn test_second_init_does_no_work() {
    let root = setup_root("run = \"record t-init-once\"\n");
    let mut core = core_for(root.path());

    core.init().unwrap();
    write_config(root.path(), "run = \"record t-init-twice\"\n");
    core.init().unwrap();

    assert_eq!(core.state(), LifecycleState::Invoke);
    assert_eq!(core.lifecycle().transitions().len(), 1);
    assert_eq!(core.run_directive(), Some("record t-init-once"));
}

#[test]
fn test_success_is_terminal() {
    let root = setup_root("run = \"record t-terminal\"\n");
    let mut core = core_for(root.path());

    bootstrap(&mut core).unwrap();
    core.invoke().unwrap();
    core.init().unwrap();

    assert_eq!(core.state(), LifecycleState::Success);
    assert_eq!(core.lifecycle().transitions().len(), 2);
    assert_eq!(calls_tagged("t-terminal").len(), 1);
}

#[test]
fn test_missing_run_directive() {
    let root = setup_root("[other]\nkey = \"value\"\n");
    let mut core = core_for(root.path());

    let err = bootstrap(&mut core).unwrap_err();

    assert!(matches!(err, CoreError::Configuration { .. }));
    assert!(err.to_string().contains("nothing to run"));
    assert_eq!(core.state(), LifecycleState::Failed);
}

#[test]
fn test_blank_run_directive() {
    let root = setup_root("run = \"   \"\n");
    let mut core = core_for(root.path());

    let err = bootstrap(&mut core).unwrap_err();
    assert!(err.to_string().contains("nothing to run"));
}

#[test]
fn test_command_without_arguments() {
    let root = setup_root("run = \"record\"\n");
    let mut core = core_for(root.path());

    bootstrap(&mut core).unwrap();
    assert_eq!(core.state(), LifecycleState::Success);
}

#[test]
fn test_resolution_failures_are_distinguishable() {
    let root = setup_root("run = \"missing t-missing\"\n");
    let mut core = core_for(root.path());
    let not_found = bootstrap(&mut core).unwrap_err();
    assert!(matches!(
        not_found,
        CoreError::Resolution(ResolutionError::UnitNotFound { ref name, .. }) if name == "missing"
    ));
    assert_eq!(core.state(), LifecycleState::Failed);

    let root = setup_root("run = \"hollow t-hollow\"\n");
    let mut core = core_for(root.path());
    let no_entry = bootstrap(&mut core).unwrap_err();
    assert!(matches!(
        no_entry,
        CoreError::Resolution(ResolutionError::EntryPointNotFound { .. })
    ));

    assert!(not_found.to_string().contains("unit not found"));
    assert!(no_entry.to_string().contains("entry point not found"));
    assert_ne!(not_found.to_string(), no_entry.to_string());
}

#[test]
fn test_descriptor_without_registered_unit() {
    let root = setup_root("run = \"ghost\"\n");
    descriptor(root.path(), "ghost.toml", "[unit]\nname = \"ghost\"\n");
    let mut core = core_for(root.path());

    let err = bootstrap(&mut core).unwrap_err();
    assert!(matches!(err, CoreError::Resolution(ResolutionError::UnitNotDefined { .. })));
}

#[test]
fn test_descriptor_selects_entry_point() {
    let root = setup_root("run = \"record t-fail x\"\n");
    descriptor(root.path(), "record.toml", "[unit]\nname = \"record\"\nentry = \"fail\"\n");
    let mut core = core_for(root.path());

    let err = bootstrap(&mut core).unwrap_err();

    assert!(matches!(err, CoreError::CommandFailed { ref command, .. } if command == "record"));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(core.state(), LifecycleState::Failed);
    assert_eq!(calls_tagged("t-fail"), vec![vec!["t-fail", "x"]]);
}

#[test]
fn test_environment_below_minimum() {
    let root = setup_root("run = \"record t-env\"\n");
    let options = CoreOptions::new(root.path())
        .with_config_file(config_path(root.path()))
        .with_runtime(RuntimeInfo {
            name: "bootcore".to_string(),
            version: "0.0.1".to_string(),
            api_version: 20200101,
        });
    let mut core = Core::new(options, registry());

    let err = core.init().unwrap_err();

    assert!(matches!(err, CoreError::Environment { .. }));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(core.state(), LifecycleState::Init);
    assert!(core.lifecycle().transitions().is_empty());
    assert!(!core.interceptor().is_installed());
    assert!(core.config().is_none());
}

#[test]
fn test_broken_configuration_is_reported_after_interceptor_install() {
    let root = setup_root("run = [\n");
    let mut core = core_for(root.path());

    let err = core.init().unwrap_err();

    assert!(matches!(err, CoreError::Configuration { .. }));
    assert!(core.interceptor().is_installed());
    assert_eq!(core.state(), LifecycleState::Failed);

    // Failed is terminal: nothing else runs
    core.init().unwrap();
    core.invoke().unwrap();
    assert_eq!(core.state(), LifecycleState::Failed);
}

#[test]
fn test_run_override_and_section_selection() {
    let root = setup_root("run = \"record t-base\"\n\n[dev]\nrun = \"record t-dev\"\n");

    let options = CoreOptions::new(root.path())
        .with_config_file(config_path(root.path()))
        .with_config_name("dev");
    let mut core = Core::new(options, registry());
    bootstrap(&mut core).unwrap();
    assert_eq!(calls_tagged("t-dev").len(), 1);

    let options = CoreOptions::new(root.path())
        .with_config_file(config_path(root.path()))
        .with_run("record t-override 1");
    let mut core = Core::new(options, registry());
    bootstrap(&mut core).unwrap();
    assert_eq!(calls_tagged("t-override"), vec![vec!["t-override", "1"]]);
    assert!(calls_tagged("t-base").is_empty());
}

#[test]
fn test_configuration_discovered_under_root() {
    let root = setup_root("run = \"record t-discovered\"\n");
    let mut core = Core::new(CoreOptions::new(root.path()), registry());

    bootstrap(&mut core).unwrap();

    assert_eq!(calls_tagged("t-discovered").len(), 1);
    assert_eq!(
        core.config().unwrap().config_file_path(),
        Some(config_path(root.path()).as_path())
    );
}

#[test]
fn test_configured_commands_dir() {
    let root = setup_root("run = \"record t-units\"\ncommands-dir = \"units\"\n");
    let units = root.path().join("units");
    fs::create_dir_all(&units).unwrap();
    fs::write(units.join("record.toml"), "[unit]\nname = \"record\"\n").unwrap();
    fs::remove_dir_all(root.path().join("commands")).unwrap();
    let mut core = core_for(root.path());

    bootstrap(&mut core).unwrap();

    assert_eq!(core.locator().unwrap().base_dir(), units.as_path());
    assert_eq!(calls_tagged("t-units").len(), 1);
}

#[test]
fn test_list_units() {
    let root = setup_root("");
    descriptor(root.path(), "orphan.toml", "[unit]\nname = \"orphan\"\ndescription = \"Left behind\"\n");
    fs::remove_file(root.path().join("commands").join("hollow.toml")).unwrap();
    let mut core = core_for(root.path());

    assert!(core.list_units().unwrap().is_empty());
    core.init().unwrap();
    let listing = core.list_units().unwrap();

    let names: Vec<&str> = listing.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["orphan", "record", "hollow"]);

    let orphan = &listing[0];
    assert!(!orphan.registered);
    assert_eq!(orphan.description, "Left behind");

    let record = &listing[1];
    assert!(record.registered);
    assert_eq!(record.description, "Record the arguments");
    assert_eq!(record.entry, "main");

    let hollow = &listing[2];
    assert!(hollow.registered && hollow.path.is_none());
}

#[test]
fn test_rejected_units_do_not_stop_registration() {
    let root = setup_root("run = \"record t-registration\"\n");
    let mut core = Core::new(
        CoreOptions::new(root.path()).with_config_file(config_path(root.path())),
        UnitRegistry::new(),
    );

    let units: Vec<Box<dyn CommandUnit>> = vec![
        Box::new(RecordUnit::new()),
        Box::new(RecordUnit::new()),
        Box::new(HollowUnit {
            info: UnitInfo::new("hollow", "0.1.0", "").with_api_version(19990101),
        }),
        Box::new(HollowUnit { info: UnitInfo::new("../escape", "0.1.0", "") }),
    ];
    let accepted = core.register_units(units);

    assert_eq!(accepted, 1);
    assert_eq!(core.registry().names(), vec!["record"]);

    bootstrap(&mut core).unwrap();
    assert_eq!(calls_tagged("t-registration").len(), 1);
}

#[test]
fn test_list_units_without_commands_directory() {
    let root = setup_root("");
    fs::remove_dir_all(root.path().join("commands")).unwrap();
    let mut core = core_for(root.path());

    core.init().unwrap();
    let listing = core.list_units().unwrap();

    let names: Vec<&str> = listing.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["hollow", "record"]);
    assert!(listing.iter().all(|l| l.registered && l.path.is_none()));
}
