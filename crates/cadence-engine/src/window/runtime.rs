use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::LoopConfig;
use crate::core::{App, AppControl, Game};
use crate::input::{
    InputEvent, InputState, Key, KeyState, Modifiers, MouseButton, MouseButtonState, WheelDelta,
};

/// Window host configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Logical width and height.
    pub initial_size: (f64, f64),
    pub fixed: LoopConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "cadence".to_string(),
            initial_size: (1280.0, 720.0),
            fixed: LoopConfig::default(),
        }
    }
}

/// winit-backed host for the variable-rate timeline.
///
/// The fixed thread starts once the event loop has resumed and a window
/// exists. Closing the window, `AppControl::Exit`, or a fixed-thread fault ends
/// the event loop; the fixed thread is joined before `run` returns.
pub struct Runtime;

impl Runtime {
    pub fn run<A: App>(config: RuntimeConfig, app: A) -> Result<()> {
        config.fixed.validate()?;

        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut host = HostState::new(config, app);

        event_loop
            .run_app(&mut host)
            .context("winit event loop terminated with error")?;

        host.finish()
    }
}

struct HostState<A: App> {
    config: RuntimeConfig,
    game: Game<A>,
    window: Option<Window>,
    exit_requested: bool,
    error: Option<anyhow::Error>,
}

impl<A: App> HostState<A> {
    fn new(config: RuntimeConfig, app: A) -> Self {
        let game = Game::new(app, config.fixed);
        Self {
            config,
            game,
            window: None,
            exit_requested: false,
            error: None,
        }
    }

    /// Clears the host-running flag so the fixed thread winds down with the window.
    fn request_exit(&mut self) {
        self.exit_requested = true;
        self.game.quit();
    }

    fn fail(&mut self, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.error.is_none() {
            self.error = Some(err);
        }
        self.request_exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (w, h) = self.config.initial_size;
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(w, h));

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        self.window = None;
        let joined = self.game.shutdown();

        match (self.error.take(), joined) {
            (Some(err), Err(fixed)) => {
                log::error!("{fixed:#}");
                Err(err)
            }
            (Some(err), Ok(_)) => Err(err),
            (None, joined) => joined.map(|_| ()),
        }
    }
}

impl<A: App> ApplicationHandler for HostState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let started = self
            .create_window(event_loop)
            .and_then(|()| self.game.start());

        if let Err(e) = started {
            self.fail(e.context("failed to start game"));
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.exit_requested && self.game.has_fixed_fault() {
            log::warn!("fixed update thread faulted; closing window");
            self.request_exit();
        }

        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw drives the variable-rate timeline.
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(window) = &self.window else {
            return;
        };

        if let Some(input) = translate_input_event(window, self.game.input(), &event) {
            if self.game.dispatch_input(input) == AppControl::Exit {
                self.request_exit();
            }
        }

        match event {
            WindowEvent::CloseRequested => self.request_exit(),

            WindowEvent::RedrawRequested => match self.game.tick_variable() {
                Ok(AppControl::Continue) => {}
                Ok(AppControl::Exit) => self.request_exit(),
                Err(e) => self.fail(e),
            },

            _ => {}
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }
}

fn translate_input_event(
    window: &Window,
    state: &InputState,
    event: &WindowEvent,
) -> Option<InputEvent> {
    let ev = match event {
        WindowEvent::ModifiersChanged(m) => InputEvent::ModifiersChanged(map_modifiers(m.state())),

        WindowEvent::Focused(f) => InputEvent::Focused(*f),

        WindowEvent::CursorLeft { .. } => InputEvent::PointerLeft,

        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = to_logical(window, *position);
            InputEvent::MouseMoved { x, y }
        }

        WindowEvent::MouseInput { state: st, button, .. } => {
            // winit reports buttons without a position; use the last one seen.
            let (x, y) = state.pointer.unwrap_or((0.0, 0.0));
            InputEvent::MouseButton {
                button: map_mouse_button(*button),
                state: match st {
                    ElementState::Pressed => MouseButtonState::Pressed,
                    ElementState::Released => MouseButtonState::Released,
                },
                x,
                y,
            }
        }

        WindowEvent::MouseWheel { delta, .. } => InputEvent::Wheel {
            delta: match delta {
                MouseScrollDelta::LineDelta(x, y) => WheelDelta::Lines { x: *x, y: *y },
                MouseScrollDelta::PixelDelta(p) => {
                    let (x, y) = to_logical(window, *p);
                    WheelDelta::Pixels { x, y }
                }
            },
            modifiers: state.modifiers,
        },

        WindowEvent::KeyboardInput { event, .. } => {
            let (key, code) = map_key(event.physical_key);
            InputEvent::Key {
                key,
                state: match event.state {
                    ElementState::Pressed => KeyState::Pressed,
                    ElementState::Released => KeyState::Released,
                },
                modifiers: state.modifiers,
                code,
                repeat: event.repeat,
            }
        }

        WindowEvent::Ime(winit::event::Ime::Commit(text)) if !text.is_empty() => {
            InputEvent::Text(text.clone())
        }

        _ => return None,
    };

    Some(ev)
}

fn to_logical(window: &Window, pos: PhysicalPosition<f64>) -> (f32, f32) {
    let logical = pos.to_logical::<f64>(window.scale_factor());
    (logical.x as f32, logical.y as f32)
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        meta: m.super_key(),
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::X1,
        WinitMouseButton::Forward => MouseButton::X2,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

fn map_key(pk: PhysicalKey) -> (Key, u32) {
    let PhysicalKey::Code(code) = pk else {
        return (Key::Unmapped(0), 0);
    };

    const LETTERS: [(KeyCode, Key); 26] = [
        (KeyCode::KeyA, Key::A), (KeyCode::KeyB, Key::B), (KeyCode::KeyC, Key::C),
        (KeyCode::KeyD, Key::D), (KeyCode::KeyE, Key::E), (KeyCode::KeyF, Key::F),
        (KeyCode::KeyG, Key::G), (KeyCode::KeyH, Key::H), (KeyCode::KeyI, Key::I),
        (KeyCode::KeyJ, Key::J), (KeyCode::KeyK, Key::K), (KeyCode::KeyL, Key::L),
        (KeyCode::KeyM, Key::M), (KeyCode::KeyN, Key::N), (KeyCode::KeyO, Key::O),
        (KeyCode::KeyP, Key::P), (KeyCode::KeyQ, Key::Q), (KeyCode::KeyR, Key::R),
        (KeyCode::KeyS, Key::S), (KeyCode::KeyT, Key::T), (KeyCode::KeyU, Key::U),
        (KeyCode::KeyV, Key::V), (KeyCode::KeyW, Key::W), (KeyCode::KeyX, Key::X),
        (KeyCode::KeyY, Key::Y), (KeyCode::KeyZ, Key::Z),
    ];
    const DIGITS: [(KeyCode, Key); 10] = [
        (KeyCode::Digit0, Key::Alpha0), (KeyCode::Digit1, Key::Alpha1),
        (KeyCode::Digit2, Key::Alpha2), (KeyCode::Digit3, Key::Alpha3),
        (KeyCode::Digit4, Key::Alpha4), (KeyCode::Digit5, Key::Alpha5),
        (KeyCode::Digit6, Key::Alpha6), (KeyCode::Digit7, Key::Alpha7),
        (KeyCode::Digit8, Key::Alpha8), (KeyCode::Digit9, Key::Alpha9),
    ];
    const FUNCTION: [(KeyCode, Key); 12] = [
        (KeyCode::F1, Key::F1), (KeyCode::F2, Key::F2), (KeyCode::F3, Key::F3),
        (KeyCode::F4, Key::F4), (KeyCode::F5, Key::F5), (KeyCode::F6, Key::F6),
        (KeyCode::F7, Key::F7), (KeyCode::F8, Key::F8), (KeyCode::F9, Key::F9),
        (KeyCode::F10, Key::F10), (KeyCode::F11, Key::F11), (KeyCode::F12, Key::F12),
    ];

    let table_hit = LETTERS
        .iter()
        .chain(DIGITS.iter())
        .chain(FUNCTION.iter())
        .find(|(c, _)| *c == code)
        .map(|(_, k)| *k);

    let key = table_hit.unwrap_or(match code {
        KeyCode::Comma => Key::Comma,
        KeyCode::Period => Key::Period,
        KeyCode::Slash => Key::Slash,
        KeyCode::Semicolon => Key::Semicolon,
        KeyCode::Quote => Key::Apostrophe,
        KeyCode::Backslash => Key::Backslash,
        KeyCode::Equal => Key::Equals,
        KeyCode::Minus => Key::Minus,
        KeyCode::Backquote => Key::Tilde,
        KeyCode::BracketLeft => Key::LeftBracket,
        KeyCode::BracketRight => Key::RightBracket,

        KeyCode::Enter => Key::Return,
        KeyCode::Escape => Key::Escape,
        KeyCode::Space => Key::Space,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::CapsLock => Key::CapsLock,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Insert => Key::Insert,
        KeyCode::Delete => Key::Delete,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,

        KeyCode::ShiftLeft => Key::LeftShift,
        KeyCode::ShiftRight => Key::RightShift,
        KeyCode::ControlLeft => Key::LeftControl,
        KeyCode::ControlRight => Key::RightControl,
        KeyCode::AltLeft => Key::LeftAlt,
        KeyCode::AltRight => Key::RightAlt,
        KeyCode::SuperLeft => Key::LeftSuper,
        KeyCode::SuperRight => Key::RightSuper,

        other => Key::Unmapped(other as u32),
    });

    (key, code as u32)
}
