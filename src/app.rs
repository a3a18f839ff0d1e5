use std::path::PathBuf;

use iced::{Color, Subscription, Task, Theme, theme, time, window};

use crate::bounds::{self, BoundsError};
use crate::config::window::{MENU_MIN_SIZE, PLACEHOLDER_SIZE, SETTINGS_SIZE};
use crate::config::{ConfigStore, Settings};
use crate::fit::Size;
use crate::media::{self, Animation, DisplayedImage};
use crate::picker::{self, PickerError};
use crate::screen::ScreenInfo;

/// What the window is showing on top of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Image,
    Menu,
    Settings,
}

#[derive(Debug, Clone)]
pub enum Message {
    WindowOpened(window::Id),
    CloseRequested(window::Id),
    /// Left button pressed on the image.
    DragStarted,
    /// Right button pressed anywhere.
    ToggleMenu,
    LoadImage,
    ImagePicked(Result<Option<PathBuf>, PickerError>),
    OpenSettings,
    WidthInputChanged(String),
    HeightInputChanged(String),
    ApplySettings,
    CancelSettings,
    DismissNotices,
    AnimationTick,
    Quit,
}

/// The overlay window: sole owner of the settings and the displayed image.
#[derive(Debug)]
pub struct App {
    store: ConfigStore,
    settings: Settings,
    screen: ScreenInfo,
    image: Option<DisplayedImage>,
    window_id: Option<window::Id>,
    mode: Mode,
    notices: Vec<String>,
    width_input: String,
    height_input: String,
}

impl App {
    /// Loads the settings and the last image. Failures become notices.
    pub fn new(store: ConfigStore, screen: ScreenInfo) -> Self {
        let mut notices = Vec::new();

        let settings = store.load().unwrap_or_else(|err| {
            tracing::error!("Failed to load config: {err}");
            notices.push(format!("Config ignored, using defaults: {err}"));
            Settings::default()
        });

        let mut app = Self {
            store,
            width_input: settings.max_width.to_string(),
            height_input: settings.max_height.to_string(),
            settings,
            screen,
            image: None,
            window_id: None,
            mode: Mode::Image,
            notices,
        };

        if let Some(path) = app.settings.image_path.clone() {
            if path.exists() {
                match media::load(&path, app.settings.bounds()) {
                    Ok(image) => app.image = Some(image),
                    Err(err) => app.notify(err.to_string()),
                }
            } else {
                tracing::warn!("Last image {:?} no longer exists", path);
            }
        }

        app
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn image(&self) -> Option<&DisplayedImage> {
        self.image.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn width_input(&self) -> &str {
        &self.width_input
    }

    pub fn height_input(&self) -> &str {
        &self.height_input
    }

    pub fn screen(&self) -> ScreenInfo {
        self.screen
    }

    /// Window size required by the current mode.
    pub fn chrome_size(&self) -> Size {
        let image = self.image.as_ref().map_or(PLACEHOLDER_SIZE, |i| i.fitted());

        match self.mode {
            Mode::Settings => SETTINGS_SIZE,
            Mode::Menu => image.max(MENU_MIN_SIZE),
            Mode::Image if !self.notices.is_empty() => image.max(MENU_MIN_SIZE),
            Mode::Image => image,
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::WindowOpened(id) => {
                self.window_id = Some(id);
                self.resize_window()
            }
            Message::CloseRequested(_) | Message::Quit => {
                self.release_image();
                iced::exit()
            }
            Message::DragStarted => match (self.mode, self.window_id) {
                (Mode::Image, Some(id)) => window::drag(id),
                _ => Task::none(),
            },
            Message::ToggleMenu => {
                self.mode = match self.mode {
                    Mode::Image => Mode::Menu,
                    Mode::Menu => Mode::Image,
                    Mode::Settings => Mode::Settings,
                };
                self.resize_window()
            }
            Message::LoadImage => {
                self.mode = Mode::Image;
                Task::batch([
                    self.resize_window(),
                    Task::perform(picker::pick_image_in_background(), Message::ImagePicked),
                ])
            }
            Message::ImagePicked(Ok(Some(path))) => {
                self.open_image(path);
                self.resize_window()
            }
            Message::ImagePicked(Ok(None)) => Task::none(),
            Message::ImagePicked(Err(err)) => {
                self.notify(err.to_string());
                self.resize_window()
            }
            Message::OpenSettings => {
                self.mode = Mode::Settings;
                self.width_input = self.settings.max_width.to_string();
                self.height_input = self.settings.max_height.to_string();
                self.resize_window()
            }
            Message::WidthInputChanged(value) => {
                self.width_input = value;
                Task::none()
            }
            Message::HeightInputChanged(value) => {
                self.height_input = value;
                Task::none()
            }
            Message::ApplySettings => {
                if let Err(err) = self.apply_bounds() {
                    tracing::warn!("Rejected bounds: {err}");
                    self.notify(err.to_string());
                }
                self.resize_window()
            }
            Message::CancelSettings => {
                self.mode = Mode::Image;
                self.resize_window()
            }
            Message::DismissNotices => {
                self.notices.clear();
                self.resize_window()
            }
            Message::AnimationTick => {
                if let Some(animation) = self.image.as_mut().and_then(DisplayedImage::animation_mut) {
                    animation.advance();
                }
                Task::none()
            }
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            window::open_events().map(Message::WindowOpened),
            window::close_requests().map(Message::CloseRequested),
        ];

        let delay = self
            .image
            .as_ref()
            .and_then(DisplayedImage::animation)
            .filter(|animation| animation.is_running())
            .and_then(Animation::current_delay);

        if let Some(delay) = delay {
            subscriptions.push(time::every(delay).map(|_| Message::AnimationTick));
        }

        Subscription::batch(subscriptions)
    }

    pub fn style(&self, theme: &Theme) -> theme::Style {
        theme::Style {
            background_color: Color::TRANSPARENT,
            text_color: theme.palette().text,
        }
    }

    fn notify(&mut self, notice: String) {
        self.notices.push(notice);
    }

    fn resize_window(&self) -> Task<Message> {
        match self.window_id {
            Some(id) => window::resize(id, self.chrome_size().into()),
            None => Task::none(),
        }
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.settings) {
            tracing::error!("Failed to save config: {err}");
            self.notify(format!("Settings not saved: {err}"));
        }
    }

    fn release_image(&mut self) {
        if let Some(image) = self.image.as_mut() {
            image.release();
        }
    }

    /// Replaces the displayed image. On failure the current one stays.
    fn open_image(&mut self, path: PathBuf) {
        if !picker::is_supported(&path) {
            self.notify(format!(
                "Unsupported file {}: choose a png, jpg, jpeg or gif image",
                path.display()
            ));
            return;
        }

        if path.to_str().is_none() {
            tracing::warn!("Refusing image with non UTF-8 path {:?}", path);
            self.notify(format!(
                "Cannot use {}: its path is not valid UTF-8 and could not be saved",
                path.display()
            ));
            return;
        }

        match media::load(&path, self.settings.bounds()) {
            Ok(image) => {
                if let Some(previous) = self.image.as_ref() {
                    tracing::debug!("Replacing {:?}", previous.path());
                }
                self.release_image();
                self.image = Some(image);
                self.settings.image_path = Some(path);
                self.persist();
            }
            Err(err) => {
                tracing::warn!("Image load failed: {err}");
                self.notify(err.to_string());
            }
        }
    }

    /// Validates the settings inputs and applies them. Clamps are reported as
    /// notices but still applied.
    fn apply_bounds(&mut self) -> Result<(), BoundsError> {
        let update = bounds::validate_bounds(&self.width_input, &self.height_input, self.screen)?;

        for clamp in &update.clamped {
            tracing::info!("Clamped bounds: {clamp}");
            self.notify(clamp.to_string());
        }

        self.settings.max_width = update.bounds.max_width();
        self.settings.max_height = update.bounds.max_height();
        self.width_input = self.settings.max_width.to_string();
        self.height_input = self.settings.max_height.to_string();
        self.persist();

        if let Some(image) = self.image.as_mut() {
            image.refit(update.bounds);
        }

        self.mode = Mode::Image;
        Ok(())
    }
}
