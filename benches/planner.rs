use std::io;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ruler_core::{
    AnsiSurface, FixedProbe, HostEvent, PointPx, Result, RulerConfig, ScaleFactor, SizePx,
    SurfaceSettings, TerminalHost, Unit, plan_axis,
};

fn tick_planning(c: &mut Criterion) {
    let scale = ScaleFactor::new(96.0).unwrap();
    c.bench_function("plan_axis_inch_4k", |b| {
        b.iter(|| {
            plan_axis(
                black_box(3840.0),
                black_box(18.0),
                Unit::Inch,
                scale,
                0.1,
                1,
            )
            .expect("plan")
        });
    });

    let pixel_scale = ScaleFactor::new(1.0).unwrap();
    c.bench_function("plan_axis_pixel_4k", |b| {
        b.iter(|| {
            plan_axis(
                black_box(3840.0),
                black_box(18.0),
                Unit::Pixel,
                pixel_scale,
                10.0,
                0,
            )
            .expect("plan")
        });
    });
}

fn pointer_storm(c: &mut Criterion) {
    let script = pointer_script();
    c.bench_function("host_pointer_storm", |b| {
        b.iter(|| {
            let mut host = build_host().expect("host");
            let mut sink = io::sink();
            host.run_scripted(&mut sink, black_box(script.clone()))
                .expect("scripted run");
        });
    });
}

fn build_host() -> Result<TerminalHost> {
    let surface = AnsiSurface::new(SurfaceSettings {
        cols: 200,
        rows: 60,
        cell_width_px: 1.0,
        cell_height_px: 1.0,
    });
    let mut host = TerminalHost::new("bench", surface);
    let config = RulerConfig {
        unit: Unit::Pixel,
        ..RulerConfig::default()
    };
    host.create_ruler(config, &mut FixedProbe::new(96.0))?;
    Ok(host)
}

fn pointer_script() -> Vec<HostEvent> {
    let mut events = Vec::new();
    for i in 0..200 {
        events.push(HostEvent::PointerMove(PointPx::new(
            (i % 180) as f64,
            (i % 50) as f64,
        )));
        if i % 50 == 49 {
            events.push(HostEvent::Resize(SizePx::new(
                200.0 + (i % 3) as f64,
                60.0,
            )));
        }
    }
    events.push(HostEvent::Exit);
    events
}

criterion_group!(benches, tick_planning, pointer_storm);
criterion_main!(benches);
