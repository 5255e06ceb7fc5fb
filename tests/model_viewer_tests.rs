mod common;

use futures::executor::block_on;
use glam::Vec3;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use common::{GatedLoader, InstantLoader};
use xylo_viewer::config::{ModelConfig, PoseAnimation};
use xylo_viewer::frame::{FixedStepFrames, FrameInfo};
use xylo_viewer::loaders::{AssetCache, AssetHandle};
use xylo_viewer::scene::{ModelPose, ModelViewer, ViewerPhase, ViewerTransition};

fn model_config(path: &str) -> ModelConfig {
    ModelConfig {
        path: path.into(),
        ..ModelConfig::default()
    }
}

/// Block until the background load has settled either way
fn settle(handle: &AssetHandle) {
    let _ = block_on(handle.wait());
}

/// Keep updating until the viewer leaves Unloaded
fn update_until_resolved(viewer: &mut ModelViewer) -> Option<ViewerTransition> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut frames = FixedStepFrames::new(0.016);
    while Instant::now() < deadline {
        let frame = frames.next()?;
        if let Some(transition) = viewer.update(&frame) {
            return Some(transition);
        }
        std::thread::yield_now();
    }
    None
}

#[cfg(test)]
mod model_viewer_tests {
    use super::*;

    #[test]
    fn test_rotation_is_independent_of_frame_rate() {
        let animation = PoseAnimation::default();

        let mut coarse = ModelPose::default();
        for frame in FixedStepFrames::new(0.1).take(10) {
            coarse.advance(&animation, &frame);
        }

        let mut fine = ModelPose::default();
        for frame in FixedStepFrames::new(0.01).take(100) {
            fine.advance(&animation, &frame);
        }

        assert!((coarse.rotation_y - fine.rotation_y).abs() < 1e-4);
        assert!((coarse.rotation_y - animation.angular_rate).abs() < 1e-4);
        assert!((coarse.position_y - fine.position_y).abs() < 1e-4);
    }

    #[test]
    fn test_stays_unloaded_while_load_pending() {
        let (loader, gate, _) = GatedLoader::new();
        let cache = AssetCache::new(loader);
        let mut viewer = ModelViewer::new(cache.request("hero.gltf"), &model_config("hero.gltf"));

        for frame in FixedStepFrames::new(0.016).take(20) {
            assert!(viewer.update(&frame).is_none());
        }
        assert_eq!(viewer.phase(), ViewerPhase::Unloaded);
        assert_eq!(viewer.model_matrix(Vec3::ZERO), None);

        gate.send(()).unwrap();
    }

    #[test]
    fn test_mounts_exactly_once_when_load_completes() {
        let (loader, gate, calls) = GatedLoader::new();
        let cache = AssetCache::new(loader);
        let handle = cache.request("hero.gltf");
        let mut viewer = ModelViewer::new(handle.clone(), &model_config("hero.gltf"));

        assert!(viewer.update(&FrameInfo::new(0, 0.016, 0.016)).is_none());

        gate.send(()).unwrap();
        settle(&handle);

        let transition = viewer.update(&FrameInfo::new(1, 0.032, 0.016));
        assert!(matches!(transition, Some(ViewerTransition::Mounted(_))));
        assert_eq!(viewer.phase(), ViewerPhase::Animating);
        assert!(viewer.asset().is_some());

        for frame in FixedStepFrames::new(0.016).take(10) {
            assert!(viewer.update(&frame).is_none());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_leaves_slot_empty() {
        let cache = AssetCache::new(InstantLoader);
        let mut viewer = ModelViewer::new(
            cache.request("missing.gltf"),
            &model_config("missing.gltf"),
        );

        let transition = update_until_resolved(&mut viewer);

        assert!(matches!(transition, Some(ViewerTransition::Failed(_))));
        assert_eq!(viewer.phase(), ViewerPhase::Failed);
        assert_eq!(viewer.model_matrix(Vec3::ZERO), None);
        let err = viewer.error().unwrap();
        assert!(err.to_string().contains("missing.gltf"));

        // Failure is terminal for this viewer
        for frame in FixedStepFrames::new(0.016).take(10) {
            assert!(viewer.update(&frame).is_none());
        }
        assert_eq!(viewer.phase(), ViewerPhase::Failed);
    }

    #[test]
    fn test_unmount_while_pending_discards_result() {
        let (loader, gate, _) = GatedLoader::new();
        let cache = AssetCache::new(loader);
        let handle = cache.request("hero.gltf");
        let mut viewer = ModelViewer::new(handle.clone(), &model_config("hero.gltf"));

        viewer.update(&FrameInfo::new(0, 0.016, 0.016));
        viewer.unmount();

        gate.send(()).unwrap();
        settle(&handle);

        for frame in FixedStepFrames::new(0.016).take(5) {
            assert!(viewer.update(&frame).is_none());
        }
        assert_eq!(viewer.phase(), ViewerPhase::Detached);
        assert!(viewer.asset().is_none());

        // The cached asset is still there for the next mount
        assert!(block_on(cache.request("hero.gltf").wait()).is_ok());
    }

    #[test]
    fn test_pose_animates_after_mount() {
        let cache = AssetCache::new(InstantLoader);
        let mut viewer = ModelViewer::new(cache.request("hero.gltf"), &model_config("hero.gltf"));
        update_until_resolved(&mut viewer).unwrap();

        let start = viewer.pose().unwrap().rotation_y;
        for frame in FixedStepFrames::new(0.1).take(10) {
            viewer.update(&frame);
        }
        let end = viewer.pose().unwrap().rotation_y;

        let rate = PoseAnimation::default().angular_rate;
        assert!((end - start - rate).abs() < 1e-4);
        assert!(viewer.model_matrix(Vec3::new(0.0, -1.0, 0.0)).is_some());
    }
}
