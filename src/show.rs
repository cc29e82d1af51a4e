use std::io::{self, Write};

use crossterm::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};

use crate::canvas::Canvas;
use crate::config::{ShowConfig, Span};
use crate::events::EventSink;
use crate::input::{random_launch, AutoLauncher, Formation, Gesture, GestureTrigger};
use crate::mosaic::MosaicLayer;
use crate::present::Presenter;
use crate::sim::{Fireworks, LaunchRequest, TriggerQueue, Viewport};

/// Which layers run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fireworks over the word mosaic.
    Show,
    Fireworks,
    Mosaic,
}

impl Mode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "show" => Some(Mode::Show),
            "fireworks" => Some(Mode::Fireworks),
            "mosaic" => Some(Mode::Mosaic),
            _ => None,
        }
    }

    fn fireworks(self) -> bool {
        matches!(self, Mode::Show | Mode::Fireworks)
    }

    fn mosaic(self) -> bool {
        matches!(self, Mode::Show | Mode::Mosaic)
    }
}

/// The whole display for one terminal: input producers, the launch queue,
/// the simulation, the background and the presenter.
pub struct Show {
    mode: Mode,
    width: usize,
    height: usize,
    scale: f32,
    canvas: Option<Canvas>,
    fireworks: Fireworks,
    mosaic: Option<MosaicLayer>,
    queue: TriggerQueue,
    gesture: GestureTrigger,
    auto: Option<AutoLauncher>,
    auto_interval: Span,
    presenter: Presenter,
}

impl Show {
    /// `cols`×`rows` terminal cells; every cell holds two pixels.
    pub fn new(mode: Mode, cols: usize, rows: usize, config: &ShowConfig, auto: bool) -> Self {
        let (width, height) = (cols, rows * 2);
        let scale = config.pixel_scale;
        let viewport = Viewport::new(width as f32 * scale, height as f32 * scale);

        Self {
            mode,
            width,
            height,
            scale,
            canvas: new_canvas(width, height, scale),
            fireworks: Fireworks::new(viewport, config),
            mosaic: mode
                .mosaic()
                .then(|| MosaicLayer::new(width, height, &config.mosaic)),
            queue: TriggerQueue::new(),
            gesture: GestureTrigger::new(),
            auto: (auto && mode.fireworks()).then(|| AutoLauncher::new(config.auto_launch.interval)),
            auto_interval: config.auto_launch.interval,
            presenter: Presenter::new(config.background, config.mosaic.opacity),
        }
    }

    /// New terminal size. Live rockets and particles carry over; the canvas
    /// and the mosaic grid start fresh.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        let (width, height) = (cols, rows * 2);
        log::info!("resize to {}x{} pixels", width, height);
        self.width = width;
        self.height = height;
        self.canvas = match self.canvas.take() {
            Some(mut canvas) if width > 0 && height > 0 => {
                canvas.resize(width, height);
                Some(canvas)
            }
            _ => new_canvas(width, height, self.scale),
        };
        self.fireworks.resize(self.viewport());
        if let Some(mosaic) = &mut self.mosaic {
            mosaic.resize(width, height);
        }
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(KeyEvent {
                code: KeyCode::Char(c),
                ..
            }) => self.handle_key(*c),
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                ..
            }) => {
                // Centre of the clicked cell, in logical units
                let x = (*column as f32 + 0.5) * self.scale;
                let y = (*row as f32 * 2.0 + 1.0) * self.scale;
                self.enqueue(LaunchRequest::at(x, y));
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, c: char) {
        if let Some(formation) = Formation::from_key(c) {
            if self.mode.fireworks() {
                log::info!("formation {}", formation.name());
                let requests = formation.requests(self.viewport(), formation.default_count());
                self.queue.extend(requests);
            }
            return;
        }

        match c {
            ' ' => self.enqueue(random_launch(self.viewport())),
            // Keyboard stand-ins for the recogniser's labels
            'f' => self.observe_gesture("Closed_Fist", 1.0),
            'o' => self.observe_gesture("Open_Palm", 1.0),
            'a' if self.mode.fireworks() => {
                self.auto = match self.auto.take() {
                    Some(_) => None,
                    None => Some(AutoLauncher::new(self.auto_interval)),
                };
                log::info!("auto launch {}", if self.auto.is_some() { "on" } else { "off" });
            }
            'm' => {
                if let Some(mosaic) = &mut self.mosaic {
                    let animate = !mosaic.animate();
                    mosaic.set_animate(animate);
                }
            }
            _ => {}
        }
    }

    /// Feed one labelled recogniser observation; a fist opening into a palm
    /// launches.
    pub fn observe_gesture(&mut self, label: &str, score: f32) {
        if self.gesture.observe(Gesture::from_label(label), score) {
            log::info!("gesture trigger");
            self.enqueue(random_launch(self.viewport()));
        }
    }

    pub fn enqueue(&mut self, request: LaunchRequest) {
        if self.mode.fireworks() {
            self.queue.push(request);
        }
    }

    /// One simulation frame of `dt` seconds.
    pub fn update(&mut self, dt: f32, sink: &mut dyn EventSink) {
        if self.mode.fireworks() {
            let viewport = self.viewport();
            if let Some(request) = self.auto.as_mut().and_then(|a| a.update(dt, viewport)) {
                self.queue.push(request);
            }
            self.fireworks.consume(&mut self.queue, sink);
            self.fireworks.tick(self.canvas.as_mut(), sink);
        }

        if let Some(mosaic) = &mut self.mosaic {
            mosaic.update(dt);
        }
    }

    pub fn render<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let canvas = if self.mode.fireworks() { self.canvas.as_ref() } else { None };
        self.presenter
            .render(out, self.width, self.height, canvas, self.mosaic.as_ref())
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width as f32 * self.scale, self.height as f32 * self.scale)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn fireworks(&self) -> &Fireworks {
        &self.fireworks
    }

    pub fn queue(&self) -> &TriggerQueue {
        &self.queue
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn mosaic(&self) -> Option<&MosaicLayer> {
        self.mosaic.as_ref()
    }

    pub fn auto_launch(&self) -> bool {
        self.auto.is_some()
    }
}

fn new_canvas(width: usize, height: usize, scale: f32) -> Option<Canvas> {
    (width > 0 && height > 0).then(|| Canvas::new(width, height, scale))
}
