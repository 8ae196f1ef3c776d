//! Integration tests for the observed-only preview policy

mod common;

use common::builders::SchedulerBuilder;
use common::mock_helpers::still_face;
use kinetic_stage::graph::PreviewRecipe;
use kinetic_stage::{RuntimeBridge, StageConfig};

#[test]
fn test_no_observed_nodes_renders_nothing() {
    let (mut scheduler, _) = SchedulerBuilder::new()
        .detector(still_face(0.5, 0.5))
        .build();
    scheduler.start().unwrap();

    let reports = common::run_ticks(&mut scheduler, 20);
    assert_eq!(reports.len(), 20);
    assert!(reports.iter().all(|r| r.previews == 0));
    assert!(scheduler.previews().is_empty());
    assert_eq!(scheduler.stats().previews_rendered, 0);
}

#[test]
fn test_single_observed_node_renders_exactly_one() {
    let (mut scheduler, ids) = SchedulerBuilder::new()
        .detector(still_face(0.5, 0.5))
        .build();
    scheduler
        .graph_mut()
        .set_observed(ids.face_tracker, true)
        .unwrap();
    scheduler.start().unwrap();

    let reports = common::run_ticks(&mut scheduler, 10);
    assert!(reports.iter().all(|r| r.previews == 1));
    assert_eq!(scheduler.stats().previews_rendered, 10);

    let previews = scheduler.previews();
    assert_eq!(previews.len(), 1);
    assert_eq!(previews[0].node, ids.face_tracker);
    assert_eq!(previews[0].recipe, PreviewRecipe::LandmarkOverlay);
}

#[test]
fn test_every_observed_node_shares_preview_size() {
    let config = StageConfig::default();
    let expected = (config.preview.width, config.preview.height);
    let (mut scheduler, ids) = SchedulerBuilder::new()
        .config(config)
        .detector(still_face(0.4, 0.5))
        .build();
    for id in [
        ids.camera,
        ids.face_tracker,
        ids.hand_tracker,
        ids.composer,
        ids.mapper,
        ids.stage_output,
    ] {
        scheduler.graph_mut().set_observed(id, true).unwrap();
    }
    scheduler.start().unwrap();

    let reports = common::run_ticks(&mut scheduler, 2);
    assert_eq!(reports[1].previews, 6);
    for preview in scheduler.previews() {
        assert_eq!(preview.image.dimensions(), expected);
    }
}

#[test]
fn test_toggling_observation_through_bridge() {
    let (bridge, link) = RuntimeBridge::new();
    let (mut scheduler, ids) = SchedulerBuilder::new()
        .detector(still_face(0.5, 0.5))
        .link(link)
        .build();
    scheduler.start().unwrap();

    bridge.set_observed(ids.mapper, true);
    let on = common::run_ticks(&mut scheduler, 3);
    assert!(on.iter().all(|r| r.previews == 1));

    bridge.set_observed(ids.mapper, false);
    let off = common::run_ticks(&mut scheduler, 3);
    assert!(off.iter().all(|r| r.previews == 0));
    assert_eq!(scheduler.stats().previews_rendered, 3);
}

#[test]
fn test_removed_node_stops_rendering() {
    let (bridge, link) = RuntimeBridge::new();
    let (mut scheduler, ids) = SchedulerBuilder::new()
        .detector(still_face(0.5, 0.5))
        .link(link)
        .build();
    scheduler
        .graph_mut()
        .set_observed(ids.hand_tracker, true)
        .unwrap();
    scheduler.start().unwrap();
    assert_eq!(common::run_ticks(&mut scheduler, 1)[0].previews, 1);

    bridge.send_command(kinetic_stage::runtime::RuntimeCommand::RemoveNode(
        ids.hand_tracker,
    ));
    let reports = common::run_ticks(&mut scheduler, 2);
    assert!(reports.iter().all(|r| r.previews == 0));
    assert_eq!(reports[1].hands, 0);
    assert_eq!(scheduler.graph().observed_count(), 0);
}

#[test]
fn test_previews_cleared_on_stop() {
    let (mut scheduler, ids) = SchedulerBuilder::new().build();
    scheduler.graph_mut().set_observed(ids.camera, true).unwrap();
    scheduler.start().unwrap();
    common::run_ticks(&mut scheduler, 1);
    assert_eq!(scheduler.previews().len(), 1);

    scheduler.stop();
    assert!(scheduler.previews().is_empty());
    // The flag outlives the session
    assert!(scheduler.graph().is_observed(ids.camera));
}
