//! UI builder: message text formatting and keyboard layouts.

use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
};

use crate::callback::{
    encode, NEXT_PAGE_EMOJI, PREV_PAGE_EMOJI, SWITCH_PAGE_CALLBACK_KEY,
};
use crate::directory::{Tank, Winery};
use crate::localization::t_lang;
use crate::pagination::{PageWindow, TankRow, MAX_BUTTON_IN_ROW};

/// Format the current page as a numbered list, one tank per line.
pub fn format_tank_list(rows: &[TankRow]) -> String {
    rows.iter()
        .map(|row| match row.temperature {
            Some(temperature) => {
                format!("{}. {} {}", row.number, row.name, sign_prefix(temperature))
            }
            None => format!("{}. {}", row.number, row.name),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Detail view for a single tank.
pub fn tank_info_text(tank: &Tank, language_code: Option<&str>) -> String {
    let batch = tank.batch_number.as_deref().unwrap_or_default();
    let temperature = tank.temperature.map(sign_prefix).unwrap_or_default();

    format!(
        "🛢️ {}: {}\n🍷 {}: {}\n🌡️ {}: {}",
        t_lang("tank-label", language_code),
        tank.name,
        t_lang("batch-label", language_code),
        batch,
        t_lang("temperature-label", language_code),
        temperature,
    )
}

fn sign_prefix(temperature: f64) -> String {
    let sign = if temperature as i64 > 0 { "+" } else { "" };
    format!("{sign}{temperature}°С")
}

/// Inline keyboard for a tank list page: selector buttons labelled with the
/// display number (payload: the tank id) in rows of at most
/// [`MAX_BUTTON_IN_ROW`], then the navigation row.
///
/// When both directions exist the two arrows share one row; a lone direction
/// gets its own single-button row; a single-page list gets no navigation row.
pub fn tank_list_keyboard(rows: &[TankRow], window: &PageWindow) -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = rows
        .chunks(MAX_BUTTON_IN_ROW)
        .map(|chunk| {
            chunk
                .iter()
                .map(|row| InlineKeyboardButton::callback(row.number.to_string(), row.id.to_string()))
                .collect()
        })
        .collect();

    if window.has_previous && window.has_next {
        keyboard.push(vec![previous_page_button(), next_page_button()]);
    } else if window.has_previous {
        keyboard.push(vec![previous_page_button()]);
    } else if window.has_next {
        keyboard.push(vec![next_page_button()]);
    }

    InlineKeyboardMarkup::new(keyboard)
}

fn previous_page_button() -> InlineKeyboardButton {
    InlineKeyboardButton::callback(
        PREV_PAGE_EMOJI,
        encode(SWITCH_PAGE_CALLBACK_KEY, PREV_PAGE_EMOJI),
    )
}

fn next_page_button() -> InlineKeyboardButton {
    InlineKeyboardButton::callback(
        NEXT_PAGE_EMOJI,
        encode(SWITCH_PAGE_CALLBACK_KEY, NEXT_PAGE_EMOJI),
    )
}

/// One inline button per winery, each on its own row.
pub fn winery_keyboard(wineries: &[Winery], callback_key: &str) -> InlineKeyboardMarkup {
    let keyboard: Vec<Vec<InlineKeyboardButton>> = wineries
        .iter()
        .map(|winery| {
            vec![InlineKeyboardButton::callback(
                winery.name.clone(),
                encode(callback_key, &winery.id.to_string()),
            )]
        })
        .collect();

    InlineKeyboardMarkup::new(keyboard)
}

/// Reply keyboard with a single contact-request button for authentication.
pub fn contact_request_keyboard(language_code: Option<&str>) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(t_lang("send-phone-number-button", language_code))
            .request(ButtonRequest::Contact),
    ]])
    .resize_keyboard()
    .one_time_keyboard()
}
