use anyhow::Result;
use log::info;
use rusted_input::engine::backends::window;
use rusted_input::engine::input::settings::SETTINGS_FILE;
use rusted_input::engine::input::{
    DevicePresenceSource, FileConfigStore, FrameInput, InputManager, InputSettings, PlayerId,
};
use rusted_input::engine::timing::{FrameClock, PollTimer};
use std::path::Path;
use std::time::Instant;
use winit::{
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    window::WindowBuilder,
};

/// Channels printed each second for every player
const WATCHED_AXES: [&str; 4] = ["Horizontal", "Vertical", "CamHorizontal", "CamVertical"];
const WATCHED_BUTTONS: [&str; 4] = ["Attack left", "Attack right", "Dodge", "Action"];

#[cfg(feature = "gamepad")]
fn open_pads() -> Box<dyn PadSource> {
    use rusted_input::engine::backends::gamepad::GamepadBackend;
    match GamepadBackend::new() {
        Ok(backend) => Box::new(backend),
        Err(e) => {
            log::warn!("Gamepads unavailable: {}", e);
            Box::new(NoPads)
        }
    }
}

#[cfg(not(feature = "gamepad"))]
fn open_pads() -> Box<dyn PadSource> {
    info!("Built without gamepad support");
    Box::new(NoPads)
}

/// Something that reports pads and pumps their events
trait PadSource: DevicePresenceSource {
    fn pump_events(&mut self, input: &mut FrameInput);
}

struct NoPads;

impl DevicePresenceSource for NoPads {
    fn connected_device_slots(&self) -> Vec<u8> {
        Vec::new()
    }
}

impl PadSource for NoPads {
    fn pump_events(&mut self, _input: &mut FrameInput) {}
}

#[cfg(feature = "gamepad")]
impl PadSource for rusted_input::engine::backends::gamepad::GamepadBackend {
    fn pump_events(&mut self, input: &mut FrameInput) {
        self.pump(input)
    }
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting input demo...");

    let settings = InputSettings::load(Path::new(SETTINGS_FILE))?;
    let mut store = FileConfigStore::new(&settings.config_dir);
    let mut pads = open_pads();

    let start = Instant::now();
    let mut input = InputManager::starting_at(FrameInput::new(), &settings, start);
    input.poll_devices(&*pads);
    input.install_defaults(&mut store)?;
    input.subscribe(|player: PlayerId| info!("{:?} configuration changed", player));

    for player in PlayerId::ALL {
        info!("{:?} uses {:?}", player, input.device_class(player));
    }

    // Create event loop and window
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Rusted Input")
        .with_inner_size(winit::dpi::LogicalSize::new(640, 360))
        .build(&event_loop)?;

    let mut clock = FrameClock::starting_at(start);
    let mut presence_timer = PollTimer::new(settings.presence_poll_period(), start);
    let mut report_timer = PollTimer::new(std::time::Duration::from_secs(1), start);

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                info!("Close requested, shutting down...");
                elwt.exit();
            }
            Event::WindowEvent {
                event: WindowEvent::RedrawRequested,
                ..
            } => {
                let now = clock.begin_frame(Instant::now());
                pads.pump_events(input.source_mut());

                if presence_timer.poll(now) {
                    for change in input.poll_devices(&*pads) {
                        info!("Device presence: {:?}", change);
                    }
                }

                if let Some(captured) = input.tick(now) {
                    info!("Captured {:?}", captured);
                }

                if report_timer.poll(now) {
                    report(&input, clock.fps());
                }

                input.source_mut().end_frame();
            }
            Event::WindowEvent { event, .. } => {
                window::handle_window_event(input.source_mut(), &event);
            }
            Event::DeviceEvent { event, .. } => {
                window::handle_device_event(input.source_mut(), &event);
            }
            Event::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}

fn report(input: &InputManager, fps: f32) {
    info!("{:.0} fps", fps);
    for player in PlayerId::ALL {
        let axes: Vec<String> = WATCHED_AXES
            .iter()
            .map(|name| format!("{}={:+.2}", name, input.get_axis(player, name)))
            .collect();
        let held: Vec<&str> = WATCHED_BUTTONS
            .iter()
            .copied()
            .filter(|name| input.get_button(player, name))
            .collect();
        info!("{:?}: {} held=[{}]", player, axes.join(" "), held.join(", "));
    }
}
