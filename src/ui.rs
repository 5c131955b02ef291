//! End-of-run panels
//!
//! Presentation is external; these types only carry what an end screen
//! needs and the show/hide/destroy lifecycle the host drives.

use serde::{Deserialize, Serialize};

use crate::sim::RunEvent;

/// Lifecycle of an on-screen panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PanelState {
    #[default]
    Hidden,
    Shown,
    Destroyed,
}

/// Buttons along the bottom of an end panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndButton {
    /// Back to the menu
    Back,
    Share,
    /// Start a new run
    Restart,
}

impl EndButton {
    pub const ALL: [EndButton; 3] = [EndButton::Back, EndButton::Share, EndButton::Restart];

    /// Texture key of the button icon
    pub fn icon(&self) -> &'static str {
        match self {
            EndButton::Back => "icon-back",
            EndButton::Share => "icon-share",
            EndButton::Restart => "icon-restart",
        }
    }
}

/// Show/hide/destroy capability shared by every panel
pub trait Panel {
    /// Texture key of the panel title
    fn title(&self) -> &'static str;

    fn state(&self) -> PanelState;

    fn set_state(&mut self, state: PanelState);

    fn show(&mut self) {
        if self.state() != PanelState::Destroyed {
            self.set_state(PanelState::Shown);
        }
    }

    fn hide(&mut self) {
        if self.state() == PanelState::Shown {
            self.set_state(PanelState::Hidden);
        }
    }

    /// Final; a destroyed panel never shows again
    fn destroy(&mut self) {
        self.set_state(PanelState::Destroyed);
    }

    fn is_visible(&self) -> bool {
        self.state() == PanelState::Shown
    }

    fn buttons(&self) -> &'static [EndButton] {
        &EndButton::ALL
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessPanel {
    pub distance: f32,
    state: PanelState,
}

impl SuccessPanel {
    pub fn new(distance: f32) -> Self {
        Self {
            distance,
            state: PanelState::Hidden,
        }
    }

    pub fn distance_label(&self) -> String {
        format!("{:.0}", self.distance)
    }
}

impl Panel for SuccessPanel {
    fn title(&self) -> &'static str {
        "success-title"
    }

    fn state(&self) -> PanelState {
        self.state
    }

    fn set_state(&mut self, state: PanelState) {
        self.state = state;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailurePanel {
    /// Run progress at failure, in `[0, 1]`
    pub progress: f32,
    state: PanelState,
}

impl FailurePanel {
    pub fn new(progress: f32) -> Self {
        Self {
            progress: progress.clamp(0.0, 1.0),
            state: PanelState::Hidden,
        }
    }

    /// Whole percent shown in the progress ring (rounded down)
    pub fn percent(&self) -> u32 {
        (self.progress * 100.0).floor() as u32
    }
}

impl Panel for FailurePanel {
    fn title(&self) -> &'static str {
        "failure-title"
    }

    fn state(&self) -> PanelState {
        self.state
    }

    fn set_state(&mut self, state: PanelState) {
        self.state = state;
    }
}

/// The end panel matching how the run ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EndPanel {
    Success(SuccessPanel),
    Failure(FailurePanel),
}

impl EndPanel {
    /// Panel for a terminal run event; `None` for every other event
    pub fn from_event(event: &RunEvent) -> Option<Self> {
        match event {
            RunEvent::Finished { distance } => Some(EndPanel::Success(SuccessPanel::new(*distance))),
            RunEvent::Failed { progress } => Some(EndPanel::Failure(FailurePanel::new(*progress))),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn Panel {
        match self {
            EndPanel::Success(p) => p,
            EndPanel::Failure(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Panel {
        match self {
            EndPanel::Success(p) => p,
            EndPanel::Failure(p) => p,
        }
    }
}

impl Panel for EndPanel {
    fn title(&self) -> &'static str {
        self.inner().title()
    }

    fn state(&self) -> PanelState {
        self.inner().state()
    }

    fn set_state(&mut self, state: PanelState) {
        self.inner_mut().set_state(state);
    }
}
