//! Interactive SDL2 host: draws the scene and picks on left click.
//!
//! Keys: `T` toggles the pick mode, `P` pauses the rotation, `+`/`-` zoom,
//! `Esc`/`Q` quit.

use std::time::Instant;

use anyhow::anyhow;
use sdl2::{
    event::{Event, WindowEvent},
    gfx::{framerate::FPSManager, primitives::DrawRenderer},
    keyboard::Keycode,
    mouse::MouseButton,
    pixels::Color,
    render::WindowCanvas,
};

use raypick::{
    camera::FrameTransform,
    geometry::EPSILON,
    matrix::Matrix4x4,
    pick_map,
    picking::{PickMode, PickResult, Pointer, Viewport},
    scene::Scene,
    vec3::Vec3,
    vec4::Vec4,
};

const TITLE: &str = "raypick";
/// Degrees per second.
const SPIN: f64 = 50.0;
const ZOOM_STEP: f64 = 0.1;

pub fn run(mut scene: Scene) -> anyhow::Result<()> {
    let ctx = sdl2::init().map_err(|e| anyhow!(e))?;
    let video = ctx.video().map_err(|e| anyhow!(e))?;
    let window = video
        .window(TITLE, scene.viewport.width, scene.viewport.height)
        .position_centered()
        .resizable()
        .build()?;

    let mut canvas = window.into_canvas().accelerated().present_vsync().build()?;
    let mut fps = FPSManager::new();
    fps.set_framerate(60).map_err(|e| anyhow!(e))?;

    let mut events = ctx.event_pump().map_err(|e| anyhow!(e))?;
    let mut mode = PickMode::default();
    let mut selection = PickResult::none();
    let mut paused = false;

    let mut last_frame = Instant::now();
    let mut last_title = Instant::now();
    let mut frames = 0u32;

    'mainloop: loop {
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                }
                | Event::KeyDown {
                    keycode: Some(Keycode::Q), ..
                } => break 'mainloop,
                Event::KeyDown {
                    keycode: Some(Keycode::T), ..
                } => {
                    mode = mode.toggle();
                    log::info!("pick mode: {}", mode);
                }
                Event::KeyDown {
                    keycode: Some(Keycode::P), ..
                } => paused = !paused,
                Event::KeyDown {
                    keycode: Some(Keycode::KpPlus | Keycode::Equals),
                    ..
                } => scene.camera.zoom(ZOOM_STEP),
                Event::KeyDown {
                    keycode: Some(Keycode::KpMinus | Keycode::Minus),
                    ..
                } => scene.camera.zoom(-ZOOM_STEP),
                Event::Window {
                    win_event: WindowEvent::SizeChanged(w, h),
                    ..
                } => {
                    scene.viewport = Viewport::new(w.max(1) as u32, h.max(1) as u32);
                }
                Event::MouseButtonDown {
                    mouse_btn: MouseButton::Left,
                    x,
                    y,
                    ..
                } => {
                    let pointer = Pointer::new(f64::from(x), f64::from(y));
                    // A failed pick leaves nothing highlighted until the next click.
                    selection = match scene.pick(pointer, mode) {
                        Ok(result) => result,
                        Err(err) => {
                            log::warn!("pick skipped: {}", err);
                            PickResult::none()
                        }
                    };
                    log::info!("selected {:?} ({})", selection.selected, mode);
                }
                _event => {}
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;
        if !paused {
            scene.camera.rotate(Vec3::new(0.0, dt * SPIN, 0.0));
        }

        draw(&mut canvas, &scene, &scene.frame(), selection.selected)?;

        frames += 1;
        if last_title.elapsed().as_secs_f64() >= 1.0 {
            let title = format!("{} ({} fps) - {}", TITLE, frames, mode);
            canvas.window_mut().set_title(&title)?;
            last_title = Instant::now();
            frames = 0;
        }

        fps.delay();
    }

    Ok(())
}

/// Flat-shaded, back to front. Triangles leaving the clip volume in depth are not drawn.
fn draw(canvas: &mut WindowCanvas, scene: &Scene, frame: &FrameTransform, selected: Option<usize>) -> anyhow::Result<()> {
    let background = pick_map::BACKGROUND;
    canvas.set_draw_color(Color::RGB(background[0], background[1], background[2]));
    canvas.clear();

    let mvp = frame.combined();
    let width = f64::from(scene.viewport.width);
    let height = f64::from(scene.viewport.height);

    let mut visible: Vec<(usize, [Vec3<f64>; 3])> = scene
        .triangles()
        .iter()
        .enumerate()
        .filter_map(|(index, triangle)| {
            let [a, b, c] = *triangle.vertices();
            Some((index, [to_ndc(&mvp, a)?, to_ndc(&mvp, b)?, to_ndc(&mvp, c)?]))
        })
        .collect();

    let depth = |ndc: &[Vec3<f64>; 3]| ndc.iter().map(|p| p.z).sum::<f64>();
    visible.sort_by(|(_, a), (_, b)| depth(b).total_cmp(&depth(a)));

    for (index, ndc) in visible {
        let color = if selected == Some(index) {
            Color::RGB(255, 255, 255)
        } else {
            let rgb = pick_map::color(index);
            Color::RGB(rgb[0], rgb[1], rgb[2])
        };

        let screen = ndc.map(|p| {
            let x = (p.x * 0.5 + 0.5) * width;
            let y = (0.5 - p.y * 0.5) * height;
            (x.round() as i16, y.round() as i16)
        });

        canvas
            .filled_trigon(
                screen[0].0,
                screen[0].1,
                screen[1].0,
                screen[1].1,
                screen[2].0,
                screen[2].1,
                color,
            )
            .map_err(|e| anyhow!(e))?;
    }

    canvas.present();
    Ok(())
}

fn to_ndc(mvp: &Matrix4x4<f64>, vertex: Vec3<f64>) -> Option<Vec3<f64>> {
    let clip = mvp * Vec4::from(vertex);
    if *clip.w() <= EPSILON {
        return None;
    }

    clip.project().filter(|p| p.is_finite() && (-1.0..=1.0).contains(&p.z))
}
