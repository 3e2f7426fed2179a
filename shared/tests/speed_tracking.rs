use assert_matches::assert_matches;
use crux_core::testing::AppTester;
use crux_core::Request;
use shared::capabilities::{
    LocationError, LocationFix, LocationOperation, LocationOutput, LocationResult,
    PermissionResult, SubscriptionId, UnixTimeMs,
};
use shared::session::PermissionStatus;
use shared::{App, Effect, Event, Model};

type Tester = AppTester<App, Effect>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Feeds events back into the app until none are left, collecting every effect.
fn run(app: &Tester, model: &mut Model, mut events: Vec<Event>) -> Vec<Effect> {
    let mut effects = Vec::new();
    while !events.is_empty() {
        let mut next = Vec::new();
        for event in events {
            let update = app.update(event, model);
            effects.extend(update.effects);
            next.extend(update.events);
        }
        events = next;
    }
    effects
}

fn location_requests(effects: Vec<Effect>) -> Vec<Request<LocationOperation>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Location(request) => Some(request),
            _ => None,
        })
        .collect()
}

fn single_location_request(effects: Vec<Effect>) -> Request<LocationOperation> {
    let mut requests = location_requests(effects);
    assert_eq!(requests.len(), 1, "expected exactly one location request");
    requests.remove(0)
}

fn released(effects: Vec<Effect>) -> Vec<SubscriptionId> {
    location_requests(effects)
        .into_iter()
        .filter_map(|request| match request.operation {
            LocationOperation::Release { subscription } => Some(subscription),
            _ => None,
        })
        .collect()
}

fn resolve(
    app: &Tester,
    model: &mut Model,
    request: &mut Request<LocationOperation>,
    result: LocationResult,
) -> Vec<Effect> {
    let update = app.resolve(request, result).expect("request should resolve");
    let mut effects = update.effects;
    effects.extend(run(app, model, update.events));
    effects
}

fn fix(speed_mps: Option<f64>) -> LocationFix {
    LocationFix::new(37.7749, -122.4194, speed_mps, UnixTimeMs(1_700_000_000_000))
}

/// Mounts the home screen and grants permission; returns the open watch request.
fn mount_and_grant(app: &Tester, model: &mut Model) -> Request<LocationOperation> {
    let effects = run(app, model, vec![Event::HomeMounted]);
    let mut permission = single_location_request(effects);
    assert_eq!(permission.operation, LocationOperation::RequestForegroundPermission);

    let granted = Ok(LocationOutput::Permission(PermissionResult::Granted));
    let watch = single_location_request(resolve(app, model, &mut permission, granted));
    assert_matches!(watch.operation, LocationOperation::Watch { .. });
    watch
}

fn started(id: &str) -> LocationResult {
    Ok(LocationOutput::Started {
        subscription: SubscriptionId::new(id),
    })
}

#[test]
fn test_speed_follows_fix_sequence() {
    init_tracing();
    let app = Tester::default();
    let mut model = Model::default();

    let mut watch = mount_and_grant(&app, &mut model);
    assert_matches!(
        watch.operation,
        LocationOperation::Watch { options } if options.is_unthrottled()
    );

    let effects = resolve(&app, &mut model, &mut watch, started("sub-1"));
    assert!(released(effects).is_empty());

    let view = app.view(&model);
    assert_eq!(view.home.speed_text, "Waiting for speed...");
    assert!(!view.home.can_share);

    let mut texts = Vec::new();
    for mps in [0.0, 5.5, 20.0, 0.0] {
        let effects = resolve(&app, &mut model, &mut watch, Ok(LocationOutput::Fix(fix(Some(mps)))));
        assert!(effects.iter().any(|e| matches!(e, Effect::Render(_))));
        texts.push(app.view(&model).home.speed_text);
    }

    assert_eq!(
        texts,
        [
            "Speed: 0.0 km/h",
            "Speed: 19.8 km/h",
            "Speed: 72.0 km/h",
            "Speed: 0.0 km/h",
        ]
    );

    let view = app.view(&model);
    assert!(view.home.has_fix);
    assert!(view.home.can_open_in_maps && view.home.can_show_on_map && view.home.can_share);
    assert_eq!(view.home.latitude, Some(37.7749));
    assert_eq!(view.home.permission, PermissionStatus::Granted);
}

#[test]
fn test_missing_speed_reads_zero() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut watch = mount_and_grant(&app, &mut model);
    resolve(&app, &mut model, &mut watch, started("sub-1"));
    resolve(&app, &mut model, &mut watch, Ok(LocationOutput::Fix(fix(None))));
    assert_eq!(app.view(&model).home.speed_kmh, 0.0);

    resolve(&app, &mut model, &mut watch, Ok(LocationOutput::Fix(fix(Some(-1.0)))));
    assert_eq!(app.view(&model).home.speed_text, "Speed: 0.0 km/h");
}

#[test]
fn test_denied_permission_shows_error_and_disables_actions() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut permission = single_location_request(run(&app, &mut model, vec![Event::HomeMounted]));
    let denied = Ok(LocationOutput::Permission(PermissionResult::Denied));
    let effects = resolve(&app, &mut model, &mut permission, denied);

    assert!(location_requests(effects).is_empty(), "no watch after denial");

    let view = app.view(&model);
    assert_eq!(view.home.permission, PermissionStatus::Denied);
    assert_eq!(
        view.home.speed_text,
        "Location permission denied. Please enable location services to use this app."
    );
    let error = view.home.error.expect("error surfaced");
    assert_eq!(error.code, "LOCATION_PERMISSION_DENIED");
    assert!(!view.home.can_share && !view.home.can_open_in_maps && !view.home.can_show_on_map);
    assert!(view.home.can_retry_permission);

    let effects = run(&app, &mut model, vec![Event::ShareLocationRequested]);
    assert!(effects.is_empty());

    // The theme keeps working without location.
    run(&app, &mut model, vec![Event::ToggleTheme]);
    assert!(app.view(&model).theme.is_dark_mode);
}

#[test]
fn test_retry_after_denial_starts_watch() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut permission = single_location_request(run(&app, &mut model, vec![Event::HomeMounted]));
    resolve(
        &app,
        &mut model,
        &mut permission,
        Ok(LocationOutput::Permission(PermissionResult::Denied)),
    );

    let mut retry = single_location_request(run(
        &app,
        &mut model,
        vec![Event::LocationPermissionRetryRequested],
    ));
    assert_eq!(retry.operation, LocationOperation::RequestForegroundPermission);
    assert!(app.view(&model).home.error.is_none());

    // A second retry while the first is pending is ignored.
    let effects = run(&app, &mut model, vec![Event::LocationPermissionRetryRequested]);
    assert!(location_requests(effects).is_empty());

    let effects = resolve(
        &app,
        &mut model,
        &mut retry,
        Ok(LocationOutput::Permission(PermissionResult::Granted)),
    );
    let watch = single_location_request(effects);
    assert_matches!(watch.operation, LocationOperation::Watch { .. });
}

#[test]
fn test_retry_without_denial_is_ignored() {
    let app = Tester::default();
    let mut model = Model::default();

    assert!(run(&app, &mut model, vec![Event::LocationPermissionRetryRequested]).is_empty());

    mount_and_grant(&app, &mut model);
    let effects = run(&app, &mut model, vec![Event::LocationPermissionRetryRequested]);
    assert!(location_requests(effects).is_empty());
}

#[test]
fn test_permission_request_failure_is_distinct_from_denial() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut permission = single_location_request(run(&app, &mut model, vec![Event::HomeMounted]));
    resolve(
        &app,
        &mut model,
        &mut permission,
        Err(LocationError::StartFailed {
            reason: "dialog crashed".into(),
        }),
    );

    let view = app.view(&model);
    assert_eq!(view.home.speed_text, "Failed to request location permission.");
    assert_eq!(view.home.error.map(|e| e.code).as_deref(), Some("LOCATION_PERMISSION_REQUEST_FAILED"));
}

#[test]
fn test_unmount_releases_subscription_once() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut watch = mount_and_grant(&app, &mut model);
    resolve(&app, &mut model, &mut watch, started("sub-1"));

    let effects = run(&app, &mut model, vec![Event::HomeUnmounted]);
    assert_eq!(released(effects), vec![SubscriptionId::new("sub-1")]);

    let effects = run(&app, &mut model, vec![Event::HomeUnmounted]);
    assert!(released(effects).is_empty());
}

#[test]
fn test_fix_after_unmount_is_ignored() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut watch = mount_and_grant(&app, &mut model);
    resolve(&app, &mut model, &mut watch, started("sub-1"));
    resolve(&app, &mut model, &mut watch, Ok(LocationOutput::Fix(fix(Some(10.0)))));
    run(&app, &mut model, vec![Event::HomeUnmounted]);

    let effects = resolve(&app, &mut model, &mut watch, Ok(LocationOutput::Fix(fix(Some(30.0)))));
    assert!(effects.is_empty());
    assert!(model.location.is_none());
}

#[test]
fn test_subscription_started_after_unmount_is_released() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut watch = mount_and_grant(&app, &mut model);

    let effects = run(&app, &mut model, vec![Event::HomeUnmounted]);
    assert!(released(effects).is_empty(), "nothing to release yet");

    let effects = resolve(&app, &mut model, &mut watch, started("late-sub"));
    assert_eq!(released(effects), vec![SubscriptionId::new("late-sub")]);
}

#[test]
fn test_permission_granted_after_unmount_starts_nothing() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut permission = single_location_request(run(&app, &mut model, vec![Event::HomeMounted]));
    run(&app, &mut model, vec![Event::HomeUnmounted]);

    let effects = resolve(
        &app,
        &mut model,
        &mut permission,
        Ok(LocationOutput::Permission(PermissionResult::Granted)),
    );
    assert!(location_requests(effects).is_empty());
}

#[test]
fn test_remount_replaces_session_and_ignores_stale_results() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut first_watch = mount_and_grant(&app, &mut model);
    resolve(&app, &mut model, &mut first_watch, started("sub-1"));

    let effects = run(&app, &mut model, vec![Event::HomeMounted]);
    let operations: Vec<LocationOperation> = location_requests(effects)
        .into_iter()
        .map(|request| request.operation)
        .collect();
    assert_eq!(operations.len(), 2);
    assert!(operations.contains(&LocationOperation::Release {
        subscription: SubscriptionId::new("sub-1"),
    }));
    assert!(operations.contains(&LocationOperation::RequestForegroundPermission));

    let effects = resolve(&app, &mut model, &mut first_watch, Ok(LocationOutput::Fix(fix(Some(5.0)))));
    assert!(effects.is_empty());
    assert!(!app.view(&model).home.has_fix);
}

#[test]
fn test_start_failure_surfaces_error_and_releases() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut watch = mount_and_grant(&app, &mut model);
    resolve(&app, &mut model, &mut watch, started("sub-1"));

    let effects = resolve(
        &app,
        &mut model,
        &mut watch,
        Err(LocationError::StartFailed {
            reason: "provider crashed".into(),
        }),
    );
    assert_eq!(released(effects), vec![SubscriptionId::new("sub-1")]);

    let view = app.view(&model);
    assert_eq!(view.home.speed_text, "Failed to start location tracking.");
    assert_eq!(view.home.error.map(|e| e.code).as_deref(), Some("LOCATION_START_FAILED"));

    let effects = run(&app, &mut model, vec![Event::HomeUnmounted]);
    assert!(released(effects).is_empty(), "already released");
}

#[test]
fn test_fix_queued_after_start_failure_is_dropped() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut watch = mount_and_grant(&app, &mut model);
    resolve(&app, &mut model, &mut watch, started("sub-1"));
    resolve(
        &app,
        &mut model,
        &mut watch,
        Err(LocationError::StartFailed {
            reason: "provider crashed".into(),
        }),
    );
    let before = app.view(&model);

    let effects = resolve(&app, &mut model, &mut watch, Ok(LocationOutput::Fix(fix(Some(10.0)))));
    assert!(effects.is_empty());

    let view = app.view(&model);
    assert_eq!(view, before);
    assert!(!view.home.has_fix);
    assert!(!view.home.can_share && !view.home.can_open_in_maps && !view.home.can_show_on_map);
    assert_eq!(view.home.speed_kmh, 0.0);
}

#[test]
fn test_unavailable_provider_message() {
    let app = Tester::default();
    let mut model = Model::default();

    let mut permission = single_location_request(run(&app, &mut model, vec![Event::HomeMounted]));
    resolve(&app, &mut model, &mut permission, Err(LocationError::NotSupported));

    let view = app.view(&model);
    assert_eq!(view.home.speed_text, "Location services are not available on this platform.");
    assert_eq!(view.home.error.map(|e| e.code).as_deref(), Some("LOCATION_UNAVAILABLE"));
}
