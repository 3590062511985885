use crate::{
    foundation::{color::Color, core::FrameIndex, math::FrameRng},
    sphere::{
        ascii::AsciiEffect,
        host::{ListenerHandle, LoopHandle, PointerEvent, RenderContext, WidgetHost},
        mesh::{Triangle, Vec3, floor_plane, uv_sphere},
        orbit::OrbitControls,
        raster::{Camera, DrawCall, Material, PointLight, SoftRasterizer},
    },
};
use std::{cell::RefCell, rc::Rc};

/// Frame cap of the widget loop (about 30 fps).
pub const FRAME_INTERVAL_MS: u64 = 33;
/// Per-frame probability of a glitch frame.
pub const GLITCH_CHANCE: f64 = 0.05;

/// Inputs of the widget. Only read when the scene is built.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SphereProps {
    /// Glyph color.
    pub color: Color,
    /// Viewport side length in pixels.
    pub size: u32,
    /// Seed of the glitch flourish.
    pub seed: u64,
}

impl Default for SphereProps {
    fn default() -> Self {
        Self {
            color: Color::rgb(0xFF, 0x2A, 0x55),
            size: 400,
            seed: 0x5eed_0a5c,
        }
    }
}

impl SphereProps {
    /// World scale relative to the 500 px reference layout.
    pub fn scale(&self) -> f64 {
        f64::from(self.size) / 500.0
    }
}

/// One rendered frame of the widget.
#[derive(Clone, Debug, PartialEq)]
pub struct AsciiFrame {
    pub rows: Vec<String>,
    pub color: Color,
    /// `1.0`, or `0.8` on a glitch frame.
    pub opacity: f64,
    /// Horizontal offset in viewport pixels, within `[-2, 2)` on a glitch frame.
    pub jitter_px: f64,
    pub at_ms: u64,
}

impl AsciiFrame {
    pub fn is_glitch(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Scene, camera rig and post-process of one mounted sphere.
pub struct SphereScene {
    props: SphereProps,
    sphere: Vec<Triangle>,
    floor: Vec<Triangle>,
    lights: [PointLight; 2],
    controls: OrbitControls,
    ascii: AsciiEffect,
    raster: SoftRasterizer,
    started_ms: u64,
    last_ms: Option<u64>,
    frames: u64,
}

impl SphereScene {
    /// Build the scene for a mount that starts at `started_ms`.
    pub fn build(props: SphereProps, started_ms: u64) -> Self {
        let s = props.scale();
        let ascii = AsciiEffect::default();
        let cells = ascii.cells_for(props.size);
        let eye = Vec3::new(0.0, 150.0 * s, 500.0 * s);
        Self {
            sphere: uv_sphere(200.0 * s, 20, 10),
            floor: floor_plane(400.0, -200.0 * s),
            lights: [
                PointLight {
                    position: Vec3::new(500.0, 500.0, 500.0),
                    intensity: 5.0,
                },
                PointLight {
                    position: Vec3::new(-500.0, -500.0, -500.0),
                    intensity: 2.0,
                },
            ],
            controls: OrbitControls::new(eye, Vec3::ZERO, f64::from(props.size))
                .with_auto_rotate(2.0),
            ascii,
            raster: SoftRasterizer::new(cells, cells),
            started_ms,
            last_ms: None,
            frames: 0,
            props,
        }
    }

    pub fn props(&self) -> &SphereProps {
        &self.props
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    /// Vertical offset of the sphere at wall time `now_ms`. The phase restarts with every
    /// mount.
    pub fn bob(&self, now_ms: u64) -> f64 {
        let s = self.props.scale();
        let ms = now_ms.saturating_sub(self.started_ms);
        50.0 * s + (ms as f64 * 0.002).sin().abs() * 100.0 * s
    }

    pub fn on_pointer(&mut self, event: &PointerEvent) {
        match *event {
            PointerEvent::Down { x, y } => self.controls.pointer_down(x, y),
            PointerEvent::Move { x, y } => self.controls.pointer_move(x, y),
            PointerEvent::Up => self.controls.pointer_up(),
        }
    }

    pub fn render(&mut self, now_ms: u64) -> AsciiFrame {
        let dt = self
            .last_ms
            .map_or(0.0, |last| now_ms.saturating_sub(last) as f64 / 1000.0);
        self.last_ms = Some(now_ms);
        self.controls.update(dt);

        let camera = Camera {
            eye: self.controls.eye(),
            target: self.controls.target(),
            fov_deg: 70.0,
            near: 1.0,
            far: 1000.0,
        };
        let calls = [
            DrawCall {
                triangles: &self.sphere,
                offset: Vec3::new(0.0, self.bob(now_ms), 0.0),
                material: Material::Phong {
                    shininess: 30.0,
                    specular: 0x11 as f64 / 255.0,
                },
            },
            DrawCall {
                triangles: &self.floor,
                offset: Vec3::ZERO,
                material: Material::Basic {
                    value: 0x33 as f64 / 255.0,
                    opacity: 0.8,
                },
            },
        ];
        let luma = self.raster.render(&camera, &self.lights, &calls);

        let mut rng =
            FrameRng::for_frame(self.props.seed, FrameIndex(self.frames), "sphere-glitch");
        self.frames += 1;
        let (opacity, jitter_px) = if rng.chance(GLITCH_CHANCE) {
            (0.8, rng.centered() * 4.0)
        } else {
            (1.0, 0.0)
        };

        AsciiFrame {
            rows: self.ascii.convert(&luma),
            color: self.props.color,
            opacity,
            jitter_px,
            at_ms: now_ms,
        }
    }
}

struct Shared {
    scene: SphereScene,
    latest: Option<AsciiFrame>,
    frames: u64,
}

/// A sphere attached to a [`WidgetHost`].
///
/// Owns exactly one frame loop, one input listener and one render context. Dropping it
/// detaches all three. When the host has no render context to give, the widget is inert:
/// it attaches nothing and never produces frames.
pub struct MountedSphere {
    _frame_loop: Option<LoopHandle>,
    _listener: Option<ListenerHandle>,
    _context: Option<RenderContext>,
    shared: Option<Rc<RefCell<Shared>>>,
    mounted_at_ms: u64,
}

impl MountedSphere {
    pub fn mount(host: &WidgetHost, props: SphereProps, now_ms: u64) -> Self {
        let Some(context) = host.acquire_context() else {
            tracing::warn!("no render context available, sphere stays blank");
            return Self {
                _frame_loop: None,
                _listener: None,
                _context: None,
                shared: None,
                mounted_at_ms: now_ms,
            };
        };

        tracing::debug!(color = %props.color.to_hex_rgb(), size = props.size, "sphere mounted");
        let shared = Rc::new(RefCell::new(Shared {
            scene: SphereScene::build(props, now_ms),
            latest: None,
            frames: 0,
        }));

        let on_frame = Rc::clone(&shared);
        let frame_loop = host.request_loop(now_ms, FRAME_INTERVAL_MS, move |t| {
            let mut st = on_frame.borrow_mut();
            let frame = st.scene.render(t);
            st.latest = Some(frame);
            st.frames += 1;
        });
        let on_input = Rc::clone(&shared);
        let listener = host.add_listener(move |ev| on_input.borrow_mut().scene.on_pointer(ev));

        Self {
            _frame_loop: Some(frame_loop),
            _listener: Some(listener),
            _context: Some(context),
            shared: Some(shared),
            mounted_at_ms: now_ms,
        }
    }

    pub fn mounted_at_ms(&self) -> u64 {
        self.mounted_at_ms
    }

    pub fn is_inert(&self) -> bool {
        self.shared.is_none()
    }

    pub fn latest_frame(&self) -> Option<AsciiFrame> {
        self.shared.as_ref()?.borrow().latest.clone()
    }

    /// Frames rendered by this mount's loop.
    pub fn frames_rendered(&self) -> u64 {
        self.shared.as_ref().map_or(0, |s| s.borrow().frames)
    }
}

impl Drop for MountedSphere {
    fn drop(&mut self) {
        if !self.is_inert() {
            tracing::debug!(frames = self.frames_rendered(), "sphere unmounted");
        }
    }
}

/// Place in the page where the sphere lives.
///
/// Props are only read at build time, so any change tears the old mount down completely
/// before the new one is built.
pub struct SphereSlot {
    host: WidgetHost,
    props: SphereProps,
    mounted: Option<MountedSphere>,
    mounts: u64,
}

impl SphereSlot {
    pub fn new(host: WidgetHost, props: SphereProps, now_ms: u64) -> Self {
        let mounted = MountedSphere::mount(&host, props.clone(), now_ms);
        Self {
            host,
            props,
            mounted: Some(mounted),
            mounts: 1,
        }
    }

    pub fn props(&self) -> &SphereProps {
        &self.props
    }

    pub fn mounted(&self) -> Option<&MountedSphere> {
        self.mounted.as_ref()
    }

    /// How many times the sphere has been built.
    pub fn mounts(&self) -> u64 {
        self.mounts
    }

    /// Returns `true` when the props changed and the sphere was rebuilt.
    pub fn set_props(&mut self, props: SphereProps, now_ms: u64) -> bool {
        if props == self.props && self.mounted.is_some() {
            return false;
        }
        self.mounted = None;
        self.mounted = Some(MountedSphere::mount(&self.host, props.clone(), now_ms));
        self.props = props;
        self.mounts += 1;
        true
    }

    pub fn unmount(&mut self) {
        self.mounted = None;
    }
}
