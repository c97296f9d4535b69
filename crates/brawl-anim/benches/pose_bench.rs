use criterion::{Criterion, criterion_group, criterion_main};
use std::collections::HashMap;
use std::f32::consts::TAU;
use std::sync::Arc;

use glam::{Quat, Vec3};

use brawl_anim::{BoneSpec, BoneTrack, BoundClip, Clip, ClipMode, Keyframe, PoseBuffer, Skeleton};

const BONES: usize = 32;
const SAMPLES: usize = 24;
const DURATION: f32 = 1.2;

/// A chain of 32 bones, roughly a humanoid rig's size.
fn build_skeleton() -> Skeleton {
    let specs = (0..BONES)
        .map(|i| BoneSpec {
            name: format!("bone_{i}"),
            parent: if i == 0 { None } else { Some(i - 1) },
            bind_rotation: Quat::IDENTITY,
            bind_translation: Vec3::new(0.0, 0.2, 0.0),
        })
        .collect();
    Skeleton::new(specs).expect("valid skeleton")
}

fn build_clip(skeleton: &Skeleton) -> Arc<BoundClip> {
    let step = DURATION / (SAMPLES - 1) as f32;
    let mut tracks = HashMap::new();
    for (index, bone) in skeleton.bones().iter().enumerate() {
        let wobble = 0.1 + index as f32 * 0.01;
        let track = BoneTrack {
            rotation: (0..SAMPLES)
                .map(|i| {
                    let t = i as f32 / SAMPLES as f32;
                    Keyframe::new(i as f32 * step, Quat::from_rotation_z((t * TAU).sin() * wobble))
                })
                .collect(),
            translation: (0..SAMPLES)
                .map(|i| Keyframe::new(i as f32 * step, bone.bind_translation()))
                .collect(),
            scale: (0..SAMPLES)
                .map(|i| Keyframe::new(i as f32 * step, Vec3::ONE))
                .collect(),
        };
        tracks.insert(bone.name().to_string(), track);
    }
    let clip = Arc::new(
        Clip::new("wobble", ClipMode::Loop, SAMPLES, DURATION, tracks).expect("valid clip"),
    );
    Arc::new(BoundClip::bind(clip, skeleton).expect("bind"))
}

fn bench_evaluate(c: &mut Criterion) {
    let skeleton = build_skeleton();
    let clip = build_clip(&skeleton);
    let mut pose = PoseBuffer::for_skeleton(&skeleton);

    let mut elapsed = 0.0_f64;
    c.bench_function("evaluate_32_bones", |b| {
        b.iter(|| {
            elapsed += 1.0 / 60.0;
            pose.evaluate(&skeleton, &clip, elapsed);
        })
    });
}

fn bench_write_skinning(c: &mut Criterion) {
    let skeleton = build_skeleton();
    let clip = build_clip(&skeleton);
    let mut pose = PoseBuffer::for_skeleton(&skeleton);
    pose.evaluate(&skeleton, &clip, 0.3);

    let mut out = Vec::with_capacity(BONES * 16);
    c.bench_function("write_skinning_32_bones", |b| {
        b.iter(|| {
            out.clear();
            pose.write_skinning(&mut out);
        })
    });
}

criterion_group!(benches, bench_evaluate, bench_write_skinning);
criterion_main!(benches);
