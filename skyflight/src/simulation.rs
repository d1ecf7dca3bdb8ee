use crate::{
    assets::CraftModel,
    config::SkyflightConfig,
    control_panel::{self, ControlPanel},
    errors::SkyflightErrors,
    input::{InputEvent, InputListeners, ListenerId, ListenerKind},
    scene::FrameSnapshot,
};
use celestial::{Destination, OrbitalSystem};
use chase_camera::ChaseCamera;
use craft::{Craft, InputMapper};
use nalgebra::Vector3;
use tracing::{debug, info};

/// Key that shows and hides the control panel.
pub const PANEL_TOGGLE_KEY: &str = "Space";

/// One running session: the craft, its controls, the chase camera and the
/// solar system, stepped together once per frame.
#[derive(Debug)]
pub struct Simulation {
    craft: Craft,
    mapper: InputMapper,
    camera: ChaseCamera,
    system: OrbitalSystem,
    panel: ControlPanel,
    model: CraftModel,
    dt: f64,
    /// View forward from the previous frame's camera update.
    camera_forward: Vector3<f64>,
    listeners: Vec<ListenerId>,
    frame: u64,
    elapsed: f64,
}

impl Simulation {
    pub fn new(config: &SkyflightConfig) -> Result<Self, SkyflightErrors> {
        config.validate()?;

        let craft = Craft::new(&config.craft);
        let mut camera = ChaseCamera::new(&config.camera);
        let camera_forward = camera.update(&craft.position());
        let system = OrbitalSystem::from_seed(&config.solar, config.seed)?;
        let panel = ControlPanel::new(craft.max_thrust());

        info!(
            "created simulation with {} bodies, craft at {:?}",
            system.body_names().count(),
            craft.position().as_slice()
        );

        Ok(Self {
            craft,
            mapper: InputMapper::new(&config.controls),
            camera,
            system,
            panel,
            model: CraftModel::new(&config.model),
            dt: config.frame.dt,
            camera_forward,
            listeners: Vec::new(),
            frame: 0,
            elapsed: 0.0,
        })
    }

    /// Registers the keyboard and pointer listeners with the host.
    pub fn attach(&mut self, listeners: &mut InputListeners) {
        if !self.listeners.is_empty() {
            return;
        }
        self.listeners.push(listeners.register(ListenerKind::Keyboard));
        self.listeners.push(listeners.register(ListenerKind::Pointer));
    }

    /// Removes every listener this simulation registered. Safe to call twice.
    pub fn dispose(&mut self, listeners: &mut InputListeners) {
        for id in self.listeners.drain(..) {
            listeners.remove(id);
        }
        self.mapper.release_all();
        self.camera.pointer_up();
    }

    pub fn is_attached(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Routes a host input event. Ignored unless listeners are attached.
    pub fn handle_event(&mut self, event: &InputEvent) {
        if !self.is_attached() {
            debug!("ignoring input while detached: {event:?}");
            return;
        }
        match event {
            InputEvent::KeyDown(key) => {
                if key.eq_ignore_ascii_case(PANEL_TOGGLE_KEY) || key == " " {
                    self.panel.toggle_visible();
                } else {
                    self.mapper.key_down(key);
                }
            }
            InputEvent::KeyUp(key) => {
                self.mapper.key_up(key);
            }
            InputEvent::PointerDown { x, y } => self.camera.pointer_down(*x, *y),
            InputEvent::PointerMove { x, y } => self.camera.pointer_move(*x, *y),
            InputEvent::PointerUp => self.camera.pointer_up(),
            InputEvent::Wheel(delta) => self.camera.wheel(*delta),
            InputEvent::FocusLost => self.mapper.release_all(),
        }
    }

    /// Advances one frame by the configured delta time.
    pub fn tick(&mut self) {
        self.tick_with(self.dt);
    }

    pub fn tick_with(&mut self, dt: f64) {
        let controls = self.mapper.update(self.camera_forward);
        self.craft.apply(&controls);
        self.craft.update(dt);

        self.camera_forward = self.camera.update(&self.craft.position());

        self.system.update();
        self.system.update_sun_light_falloff(&self.craft.position());

        self.frame += 1;
        self.elapsed += dt;
    }

    /// Teleports the craft to a named destination and turns the camera with it.
    pub fn teleport(&mut self, destination: &str) -> Result<(), SkyflightErrors> {
        let target = self
            .system
            .teleport_target(destination)
            .ok_or_else(|| SkyflightErrors::UnknownDestination(destination.to_string()))?;

        self.camera
            .teleport_to(&mut self.craft, target.position, target.facing);
        self.camera_forward = self.camera.pose().forward;
        debug!("teleported to {destination}");
        Ok(())
    }

    pub fn toggle_indicators(&mut self) -> bool {
        self.system.toggle_indicators()
    }

    pub fn set_rotation_level(&mut self, level: u8) {
        self.panel.set_rotation_level(level, &mut self.system);
    }

    pub fn set_orbit_level(&mut self, level: u8) {
        self.panel.set_orbit_level(level, &mut self.system);
    }

    pub fn set_thrust_power(&mut self, power: f64) {
        self.panel.set_thrust_power(power, &mut self.craft);
    }

    pub fn destinations(&self) -> Vec<Destination> {
        self.system.destinations()
    }

    /// Craft speed in Earth diameters per second.
    pub fn hud_speed(&self) -> f64 {
        control_panel::speed_in_earth_diameters(&self.craft, &self.system).unwrap_or(0.0)
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(&self.craft, &self.model, self.camera.pose(), &self.system)
    }

    pub fn craft(&self) -> &Craft {
        &self.craft
    }

    pub fn camera(&self) -> &ChaseCamera {
        &self.camera
    }

    pub fn system(&self) -> &OrbitalSystem {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut OrbitalSystem {
        &mut self.system
    }

    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    pub fn model_mut(&mut self) -> &mut CraftModel {
        &mut self.model
    }

    pub fn camera_forward(&self) -> Vector3<f64> {
        self.camera_forward
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn simulation() -> Simulation {
        let mut sim = Simulation::new(&SkyflightConfig {
            seed: Some(11),
            ..Default::default()
        })
        .unwrap();
        sim.attach(&mut InputListeners::new());
        sim
    }

    #[test]
    fn test_starts_at_spawn_point() {
        let sim = simulation();
        assert_eq!(sim.craft().position(), Vector3::new(0.0, 0.0, 12000.0));
        assert_abs_diff_eq!(sim.camera_forward(), Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
        assert_eq!(sim.frame(), 0);
    }

    #[test]
    fn test_events_route_to_components() {
        let mut sim = simulation();
        sim.handle_event(&InputEvent::Wheel(-1e6));
        assert_eq!(sim.camera().follow_distance(), 5.0);

        sim.handle_event(&InputEvent::PointerDown { x: 0.0, y: 0.0 });
        sim.handle_event(&InputEvent::PointerMove { x: 0.0, y: 10_000.0 });
        assert_eq!(sim.camera().pitch(), 1.48);
        sim.handle_event(&InputEvent::PointerUp);
        assert!(!sim.camera().is_dragging());

        sim.handle_event(&InputEvent::KeyDown("Space".into()));
        assert!(!sim.panel().is_visible());
    }

    #[test]
    fn test_focus_lost_releases_keys() {
        let mut sim = simulation();
        sim.handle_event(&InputEvent::KeyDown("w".into()));
        sim.handle_event(&InputEvent::FocusLost);
        sim.tick();
        assert_eq!(sim.craft().velocity(), Vector3::zeros());
    }

    #[test]
    fn test_attach_and_dispose() {
        let mut listeners = InputListeners::new();
        let mut sim = Simulation::new(&SkyflightConfig::default()).unwrap();
        sim.attach(&mut listeners);
        sim.attach(&mut listeners);
        assert_eq!(listeners.len(), 2);
        assert!(sim.is_attached());

        sim.dispose(&mut listeners);
        assert!(listeners.is_empty());
        sim.dispose(&mut listeners);
        assert!(listeners.is_empty());
        assert!(!sim.is_attached());
    }

    #[test]
    fn test_events_ignored_after_dispose() {
        let mut listeners = InputListeners::new();
        let mut sim = Simulation::new(&SkyflightConfig::default()).unwrap();
        sim.attach(&mut listeners);
        sim.dispose(&mut listeners);

        sim.handle_event(&InputEvent::KeyDown("w".into()));
        sim.handle_event(&InputEvent::Wheel(-1e6));
        sim.handle_event(&InputEvent::PointerDown { x: 0.0, y: 0.0 });
        sim.tick();

        assert_eq!(sim.craft().velocity(), Vector3::zeros());
        assert_eq!(sim.camera().follow_distance(), 30.0);
        assert!(!sim.camera().is_dragging());
        assert!(sim.panel().is_visible());
    }

    #[test]
    fn test_unknown_destination() {
        let mut sim = simulation();
        assert!(matches!(
            sim.teleport("Vulcan"),
            Err(SkyflightErrors::UnknownDestination(_))
        ));
        assert_eq!(sim.craft().position(), Vector3::new(0.0, 0.0, 12000.0));
    }

    #[test]
    fn test_light_tracks_craft() {
        let mut sim = simulation();
        sim.tick();
        assert_eq!(sim.system().sun_light_intensity(), 1e9);
        sim.teleport("Pluto").unwrap();
        sim.tick();
        assert!(sim.system().sun_light_intensity() > 1e9);
    }
}
