//! Window, event loop and presentation cadence

use std::io::{Read, Seek};
use std::sync::Arc;

use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use super::gpu::Nv12Renderer;
use crate::pipeline::{Player, SwapPacer};
use crate::{Config, DisplayConfig, Error, FrameLayout, Result};

/// Application handler for the winit event loop
pub struct PlayerApp<R> {
    config: DisplayConfig,
    layout: FrameLayout,
    player: Player<R>,
    pacer: SwapPacer,
    renderer: Option<Nv12Renderer>,
    error: Option<Error>,
}

impl<R: Read + Seek> PlayerApp<R> {
    pub fn new(config: DisplayConfig, layout: FrameLayout, player: Player<R>) -> Self {
        Self {
            pacer: SwapPacer::new(config.swap_interval),
            config,
            layout,
            player,
            renderer: None,
            error: None,
        }
    }

    fn init_renderer(&self, event_loop: &ActiveEventLoop) -> Result<Nv12Renderer> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.layout.width, self.layout.height));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| Error::Window(e.to_string()))?,
        );

        pollster::block_on(Nv12Renderer::new(window, self.layout))
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        let result = if self.pacer.advance() {
            self.player.tick(renderer).map(|_| ())
        } else {
            renderer.redraw()
        };

        if let Err(e) = result {
            self.fail(event_loop, e);
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, e: Error) {
        error!("Stopping playback: {}", e);
        self.error = Some(e);
        event_loop.exit();
    }
}

impl<R: Read + Seek> ApplicationHandler for PlayerApp<R> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        match self.init_renderer(event_loop) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                info!("Window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(ref mut renderer) = self.renderer {
                    renderer.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref renderer) = self.renderer {
            renderer.window.request_redraw();
        }
    }
}

/// Run the display event loop until the window closes or playback fails
pub fn run<R: Read + Seek>(config: &Config, player: Player<R>) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| Error::Window(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = PlayerApp::new(config.display.clone(), config.source.layout(), player);

    event_loop
        .run_app(&mut app)
        .map_err(|e| Error::Window(e.to_string()))?;

    info!(
        "Presented {} frames, {} rewinds",
        app.player.presented(),
        app.player.source().rewinds()
    );

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
