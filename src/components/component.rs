use crate::chat::ChatPanel;
use crate::page::{PageController, PageId};
use anyhow::Result;
use crossterm::event::{Event, KeyEvent};
use ratatui::prelude::*;

/// Read-only view of application state handed to components.
#[derive(Clone, Copy)]
pub struct View<'a> {
    pub controller: &'a PageController,
    pub chat: &'a ChatPanel,
    /// Whether key presses go to the chat input.
    pub chat_focused: bool,
}

/// Action that a component can return after handling an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentAction {
    /// No action needed
    None,
    /// Dismiss the activation splash
    Activate,
    /// Request a transition to a page
    Navigate(PageId),
    /// Move key focus into or out of the chat input
    FocusChat(bool),
    /// Edit the chat input line
    EditInput(KeyEvent),
    /// Submit the chat input line
    Submit,
    /// Scroll the active page by rows
    Scroll(i32),
    /// Pointer moved, in normalized page coordinates (x right, y up)
    Pointer { x: i32, y: i32 },
    /// Quit the application
    Quit,
    /// Component state was updated, needs re-render
    Update,
}

impl ComponentAction {
    /// Scale used to carry normalized pointer coordinates as integers.
    pub const POINTER_SCALE: f32 = 1000.0;

    /// Pointer action for a position normalized to `-1.0..=1.0`.
    pub fn pointer(x: f32, y: f32) -> Self {
        Self::Pointer {
            x: (x.clamp(-1.0, 1.0) * Self::POINTER_SCALE) as i32,
            y: (y.clamp(-1.0, 1.0) * Self::POINTER_SCALE) as i32,
        }
    }
}

/// Trait for all UI components
///
/// Components render from a [`View`] and translate terminal events into
/// actions; the app applies the actions to the controller and chat.
pub trait Component {
    /// Render the component to the given area
    fn render(&mut self, frame: &mut Frame, area: Rect, view: &View<'_>) -> Result<()>;

    /// Handle an event (keyboard, mouse, etc.)
    /// Returns an action that the app should take
    fn handle_event(&mut self, event: &Event, view: &View<'_>) -> Result<ComponentAction>;
}

/// Normalize a cell inside `area` to `-1.0..=1.0` on both axes, up positive.
pub fn normalized_pointer(area: Rect, column: u16, row: u16) -> (f32, f32) {
    let half_w = (f32::from(area.width) / 2.0).max(1.0);
    let half_h = (f32::from(area.height) / 2.0).max(1.0);
    let x = (f32::from(column) - f32::from(area.x) - half_w) / half_w;
    let y = (half_h - (f32::from(row) - f32::from(area.y))) / half_h;
    (x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0))
}
