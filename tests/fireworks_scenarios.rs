//! End-to-end scenarios for the launch queue, rockets and bursts, run
//! headless: no terminal, and a canvas only where drawing is under test.
//!
//! Covered scenarios:
//! 1. A single request climbs from the ground and bursts once at its target.
//! 2. A batch of requests becomes rockets in one drain, in order.
//! 3. Draining an empty queue twice launches nothing.
//! 4. Particle invariants hold over whole lifetimes.
//! 5. A motionless sparkle only drifts under gravity.
//! 6. Painting fades old light and never leaves the canvas out of range.

use std::rc::Rc;

use neonburst::canvas::Canvas;
use neonburst::config::{ParticleConfig, ShowConfig};
use neonburst::palette::Palette;
use neonburst::sim::{Fireworks, LaunchRequest, Particle, ParticleKind, TriggerQueue, Viewport};
use neonburst::ShowEvent;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn fireworks() -> Fireworks {
    Fireworks::new(Viewport::new(800.0, 600.0), &ShowConfig::default())
}

/// Tick until no rocket is left, returning every event raised on the way.
fn run_until_burst(fw: &mut Fireworks, canvas: Option<&mut Canvas>) -> Vec<ShowEvent> {
    let mut events = Vec::new();
    let mut canvas = canvas;
    for _ in 0..1000 {
        if fw.rockets().is_empty() {
            break;
        }
        fw.tick(canvas.as_deref_mut(), &mut events);
    }
    events
}

fn count(fw: &Fireworks, kinds: &[ParticleKind]) -> usize {
    fw.particles()
        .iter()
        .filter(|p| kinds.contains(&p.kind()))
        .count()
}

// ── Launch and burst ──────────────────────────────────────────────────────────

/// One request with no palette or scale climbs from the bottom edge and bursts
/// into one full batch around its target.
#[test]
fn single_request_bursts_once_at_target() {
    let mut fw = fireworks();
    let mut queue = TriggerQueue::new();
    queue.push(LaunchRequest::at(100.0, 50.0));

    let mut events = Vec::new();
    assert_eq!(fw.consume(&mut queue, &mut events), 1);
    let rocket = &fw.rockets()[0];
    assert_eq!(rocket.start_y(), 600.0, "rockets start at the viewport bottom");
    assert_eq!(rocket.target_y(), 50.0);
    assert_eq!(rocket.x(), 100.0);

    events.extend(run_until_burst(&mut fw, None));
    assert_eq!(events, vec![ShowEvent::Launch, ShowEvent::Explosion]);

    assert_eq!(count(&fw, &[ParticleKind::Core]), 15);
    let shells = count(&fw, &[ParticleKind::Shell]);
    assert!((80..=120).contains(&shells), "{} shells", shells);
    let accents = count(&fw, &[ParticleKind::Sparkle, ParticleKind::Willow]);
    assert!((30..=40).contains(&accents), "{} accents", accents);

    // Bursts update in the frame they spawn, so each particle has moved once
    for p in fw.particles() {
        let d = ((p.x() - 100.0).powi(2) + (p.y() - 50.0).powi(2)).sqrt();
        assert!(d < 11.0, "particle {:?} spawned {} away from the origin", p.kind(), d);
        assert_eq!(p.age(), 1);
    }
}

/// Five requests queued together become five rockets in one drain call, in
/// the order they were queued.
#[test]
fn batch_drain_preserves_order() {
    let mut fw = fireworks();
    let mut queue = TriggerQueue::new();
    let xs = [120.0, 640.0, 300.0, 480.0, 50.0];
    queue.extend(xs.iter().map(|&x| LaunchRequest::at(x, 100.0)));

    let mut events = Vec::new();
    assert_eq!(fw.consume(&mut queue, &mut events), 5);
    assert!(queue.is_empty(), "drain must empty the queue");
    let launched: Vec<f32> = fw.rockets().iter().map(|r| r.x()).collect();
    assert_eq!(launched, xs.to_vec());
    assert_eq!(events.len(), 5);
}

/// Draining an empty queue is idempotent.
#[test]
fn empty_drains_launch_nothing() {
    let mut fw = fireworks();
    let mut queue = TriggerQueue::new();
    let mut events = Vec::new();
    fw.consume(&mut queue, &mut events);
    fw.consume(&mut queue, &mut events);
    assert!(fw.rockets().is_empty());
    assert!(events.is_empty());
}

// ── Particle invariants ───────────────────────────────────────────────────────

/// Alpha stays in [0, 1] and tracks life; size is zero before the bloom
/// delay and never shrinks after it; trails stay capped.
#[test]
fn particle_invariants_hold_for_whole_lifetimes() {
    let config = ParticleConfig::default();
    let palette = Rc::new(Palette::MYSTIC_BLUE);
    for kind in [
        ParticleKind::Core,
        ParticleKind::Shell,
        ParticleKind::Sparkle,
        ParticleKind::Willow,
    ] {
        let mut p = Particle::new(400.0, 300.0, Rc::clone(&palette), 5.0, 1.0, kind, 1.0, &config);
        let mut last_size = 0.0;
        while p.is_alive() {
            p.update();
            assert!((0.0..=1.0).contains(&p.alpha()), "{:?} alpha {}", kind, p.alpha());
            assert!((p.alpha() - (p.life() / p.max_life()).max(0.0)).abs() < 1e-6);
            if (p.age() as f32) < p.bloom_delay() {
                assert_eq!(p.current_size(), 0.0, "{:?} bloomed early", kind);
            } else {
                assert!(p.current_size() >= last_size, "{:?} shrank", kind);
            }
            last_size = p.current_size();
            assert!(p.trail_len() <= 25);
            assert!(p.age() < 1000, "{:?} never died", kind);
        }
    }
}

/// A sparkle launched with no speed drifts straight down and not far.
#[test]
fn motionless_sparkle_stays_near_origin() {
    let config = ParticleConfig::default();
    let mut p = Particle::new(
        200.0,
        200.0,
        Rc::new(Palette::MYSTIC_BLUE),
        0.0,
        0.0,
        ParticleKind::Sparkle,
        1.0,
        &config,
    );
    while p.is_alive() {
        p.update();
        assert_eq!(p.x(), 200.0, "sparkles have no turbulence");
        assert!(p.y() >= 200.0 && p.y() < 225.0, "drifted to y={}", p.y());
    }
}

// ── Painting ──────────────────────────────────────────────────────────────────

/// After a burst has burnt out, the trail fade clears the canvas again.
#[test]
fn canvas_fades_back_to_transparent() {
    let mut fw = fireworks();
    let mut canvas = Canvas::new(200, 150, 4.0);
    fw.launch(LaunchRequest::at(400.0, 200.0), &mut Vec::new());
    run_until_burst(&mut fw, Some(&mut canvas));

    let lit = |c: &Canvas| (0..150).any(|y| (0..200).any(|x| c.pixel(x, y)[3] > 0.01));
    assert!(lit(&canvas), "the burst must be visible");

    for _ in 0..400 {
        fw.tick(Some(&mut canvas), &mut Vec::new());
    }
    assert!(fw.particles().is_empty());
    assert!(!lit(&canvas), "fade must clear burnt-out light");
    for y in 0..150 {
        for x in 0..200 {
            let px = canvas.pixel(x, y);
            assert!(px.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }
}
