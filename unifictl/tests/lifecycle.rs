//! Integration tests for controller start/stop.

use unifictl::platform::{Mount, NetworkMode, PortMapping};
use unifictl::{
    ControllerError, ControllerManager, ControllerOptions, ServerPrefix, StopOutcome, VersionPins,
};
use unifictl_test_utils::{Call, FailPoint, FakePlatform};

const CONTROLLER_REPO: &str = "magnetikonline/unifi-network-controller";

fn options() -> ControllerOptions {
    ControllerOptions::from_pins(&VersionPins {
        unifi: "8.6.9".into(),
        mongodb: Some("4.4.29".into()),
    })
}

fn manager() -> ControllerManager<FakePlatform> {
    let platform = FakePlatform::new();
    platform.add_image(CONTROLLER_REPO, "8.6.9");
    ControllerManager::new(platform, options())
}

fn prefix(name: &str) -> ServerPrefix {
    ServerPrefix::new(name).unwrap()
}

fn run_spec(calls: &[Call]) -> unifictl::platform::RunSpec {
    calls
        .iter()
        .find_map(|c| match c {
            Call::RunContainer(spec) => Some(spec.clone()),
            _ => None,
        })
        .expect("run_container was called")
}

#[tokio::test]
async fn test_start_creates_volumes_and_container() {
    let mgr = manager();

    let report = mgr.start(&prefix("test"), true).await.unwrap();

    assert_eq!(report.container, "test-server");
    assert_eq!(report.image, "magnetikonline/unifi-network-controller:8.6.9");
    assert_eq!(report.created_volumes, vec!["test-data", "test-log"]);
    assert_eq!(report.pulled_image, None);
    assert!(!report.container_id.is_empty());

    let platform = mgr.platform();
    assert!(platform.has_volume("test-data"));
    assert!(platform.has_volume("test-log"));
    assert!(platform.container("test-server").unwrap().running);
}

#[tokio::test]
async fn test_start_host_network_mounts_and_auto_remove() {
    let mgr = manager();
    mgr.start(&prefix("test"), true).await.unwrap();

    let spec = run_spec(&mgr.platform().calls());
    assert_eq!(spec.network, NetworkMode::Host);
    assert!(spec.auto_remove);
    assert_eq!(
        spec.mounts,
        vec![
            Mount::Volume {
                source: "test-data".into(),
                target: "/usr/lib/unifi/data".into(),
            },
            Mount::Volume {
                source: "test-log".into(),
                target: "/usr/lib/unifi/logs".into(),
            },
        ]
    );
}

#[tokio::test]
async fn test_start_without_host_network_publishes_ports() {
    let mgr = manager();
    mgr.start(&prefix("test"), false).await.unwrap();

    let spec = run_spec(&mgr.platform().calls());
    assert_eq!(
        spec.network,
        NetworkMode::Published(vec![PortMapping::same(8080), PortMapping::same(8443)])
    );
}

#[tokio::test]
async fn test_start_reuses_existing_volumes() {
    let mgr = manager();
    mgr.platform()
        .add_volume("test-data", &[("system.properties", "keep")]);

    let report = mgr.start(&prefix("test"), true).await.unwrap();
    assert_eq!(report.created_volumes, vec!["test-log"]);

    let data = mgr.platform().volume_path("test-data").unwrap();
    assert_eq!(std::fs::read_to_string(data.join("system.properties")).unwrap(), "keep");
}

#[tokio::test]
async fn test_start_pulls_missing_image() {
    let mgr = ControllerManager::new(FakePlatform::new(), options());

    let report = mgr.start(&prefix("test"), true).await.unwrap();
    assert_eq!(
        report.pulled_image.as_deref(),
        Some("magnetikonline/unifi-network-controller:8.6.9")
    );
    assert!(
        mgr.platform()
            .calls()
            .contains(&Call::PullImage(report.image.clone()))
    );
}

#[tokio::test]
async fn test_start_already_running_fails_without_side_effects() {
    let mgr = manager();
    mgr.platform().add_running_container("test-server");

    let err = mgr.start(&prefix("test"), true).await.unwrap_err();

    assert!(matches!(err, ControllerError::AlreadyRunning(ref name) if name == "test-server"));
    assert!(err.to_string().contains("already running"));
    assert!(err.is_precondition());
    assert!(mgr.platform().mutating_calls().is_empty());
    assert_eq!(mgr.platform().container_count(), 1);
}

#[tokio::test]
async fn test_second_start_fails() {
    let mgr = manager();
    mgr.start(&prefix("test"), true).await.unwrap();

    let err = mgr.start(&prefix("test"), true).await.unwrap_err();
    assert!(matches!(err, ControllerError::AlreadyRunning(_)));
    assert_eq!(mgr.platform().container_count(), 1);
}

#[tokio::test]
async fn test_start_with_stopped_container_fails() {
    let mgr = manager();
    mgr.platform().add_stopped_container("test-server");

    let err = mgr.start(&prefix("test"), true).await.unwrap_err();
    assert!(matches!(err, ControllerError::AlreadyExists(_)));
    assert!(mgr.platform().mutating_calls().is_empty());
}

#[tokio::test]
async fn test_start_surfaces_platform_failure() {
    let mgr = manager();
    mgr.platform()
        .fail_on(FailPoint::RunContainer, "port is already allocated");

    let err = mgr.start(&prefix("test"), false).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "unable to run container [test-server]: port is already allocated"
    );
}

#[tokio::test]
async fn test_start_then_stop_preserves_volumes() {
    let mgr = manager();
    let prefix = prefix("site-a");

    mgr.start(&prefix, true).await.unwrap();
    let outcome = mgr.stop(&prefix).await.unwrap();

    assert_eq!(
        outcome,
        StopOutcome::Stopped {
            container: "site-a-server".into()
        }
    );
    assert!(mgr.platform().container("site-a-server").is_none());
    assert!(mgr.platform().has_volume("site-a-data"));
    assert!(mgr.platform().has_volume("site-a-log"));
    assert!(
        !mgr.platform()
            .calls()
            .iter()
            .any(|c| matches!(c, Call::RemoveVolume(_)))
    );
}

#[tokio::test]
async fn test_stop_when_nothing_running_is_noop() {
    let mgr = manager();

    let outcome = mgr.stop(&prefix("test")).await.unwrap();

    assert_eq!(
        outcome,
        StopOutcome::NotRunning {
            container: "test-server".into()
        }
    );
    assert!(mgr.platform().mutating_calls().is_empty());
}

#[tokio::test]
async fn test_stop_ignores_stopped_container() {
    let mgr = manager();
    mgr.platform().add_stopped_container("test-server");

    let outcome = mgr.stop(&prefix("test")).await.unwrap();
    assert!(matches!(outcome, StopOutcome::NotRunning { .. }));
    assert!(mgr.platform().mutating_calls().is_empty());
}

#[tokio::test]
async fn test_prefixes_are_isolated() {
    let mgr = manager();
    mgr.start(&prefix("alpha"), true).await.unwrap();
    mgr.start(&prefix("bravo"), true).await.unwrap();

    mgr.stop(&prefix("alpha")).await.unwrap();

    assert!(mgr.platform().container("alpha-server").is_none());
    assert!(mgr.platform().container("bravo-server").unwrap().running);
}
