use iced::alignment::{Horizontal, Vertical};
use iced::widget::{button, column, container, image, mouse_area, row, stack, text, text_input};
use iced::{ContentFit, Element, Length};

use crate::app::{App, Message, Mode};

impl App {
    pub fn view(&self) -> Element<'_, Message> {
        let content = match self.mode() {
            Mode::Settings => self.settings_panel(),
            Mode::Menu => stack![self.picture(), centered(context_menu())].into(),
            Mode::Image => self.picture(),
        };

        if self.notices().is_empty() || self.mode() == Mode::Settings {
            content
        } else {
            stack![content, centered(self.notice_box())].into()
        }
    }

    /// The image itself, draggable and right-clickable.
    fn picture(&self) -> Element<'_, Message> {
        let picture: Element<'_, Message> = match self.image() {
            Some(displayed) => {
                let fitted = displayed.fitted();
                match displayed.current_handle() {
                    Some(handle) => image(handle.clone())
                        .width(Length::Fixed(fitted.width as f32))
                        .height(Length::Fixed(fitted.height as f32))
                        .content_fit(ContentFit::Fill)
                        .into(),
                    None => text("").into(),
                }
            }
            None => container(text("Right-click to load an image"))
                .padding(12)
                .width(Length::Fill)
                .height(Length::Fill)
                .align_x(Horizontal::Center)
                .align_y(Vertical::Center)
                .style(container::rounded_box)
                .into(),
        };

        mouse_area(picture)
            .on_press(Message::DragStarted)
            .on_right_press(Message::ToggleMenu)
            .into()
    }

    fn settings_panel(&self) -> Element<'_, Message> {
        let screen = self.screen();
        let settings = self.settings();

        let mut panel = column![
            text("Settings").size(18),
            text(format!(
                "Max width (current: {}, max: {})",
                settings.max_width, screen.width
            )),
            text_input("Max width", self.width_input())
                .on_input(Message::WidthInputChanged)
                .on_submit(Message::ApplySettings),
            text(format!(
                "Max height (current: {}, max: {})",
                settings.max_height, screen.height
            )),
            text_input("Max height", self.height_input())
                .on_input(Message::HeightInputChanged)
                .on_submit(Message::ApplySettings),
            row![
                button(text("Apply")).on_press(Message::ApplySettings),
                button(text("Cancel"))
                    .on_press(Message::CancelSettings)
                    .style(button::secondary),
            ]
            .spacing(8),
        ]
        .spacing(6);

        if let Some(displayed) = self.image() {
            panel = panel.push(
                text(format!(
                    "Image: {} shown at {}",
                    displayed.intrinsic(),
                    displayed.fitted()
                ))
                .size(13),
            );
        }

        if !self.notices().is_empty() {
            panel = panel.push(self.notice_list());
        }

        container(panel)
            .padding(12)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(container::rounded_box)
            .into()
    }

    fn notice_list(&self) -> Element<'_, Message> {
        let mut list = column![].spacing(4);
        for notice in self.notices() {
            list = list.push(text(notice.as_str()).size(13));
        }
        list.push(
            button(text("OK").size(13))
                .on_press(Message::DismissNotices)
                .style(button::secondary),
        )
        .into()
    }

    fn notice_box(&self) -> Element<'_, Message> {
        container(self.notice_list())
            .padding(10)
            .max_width(MAX_NOTICE_WIDTH)
            .style(container::rounded_box)
            .into()
    }
}

const MAX_NOTICE_WIDTH: f32 = 360.0;

fn context_menu<'a>() -> Element<'a, Message> {
    let item = |label: &'a str, message: Message| {
        button(text(label))
            .on_press(message)
            .width(Length::Fill)
            .style(button::text)
    };

    container(
        column![
            item("Load image", Message::LoadImage),
            item("Settings", Message::OpenSettings),
            item("Quit", Message::Quit),
        ]
        .spacing(2)
        .width(Length::Fixed(160.0)),
    )
    .padding(6)
    .style(container::rounded_box)
    .into()
}

fn centered<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(Horizontal::Center)
        .align_y(Vertical::Center)
        .into()
}
