use std::collections::HashMap;

/// Continuous movement controls.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
}

/// How long a single key press keeps a control held. Terminals report
/// presses and repeats but no releases.
pub const TAP_HOLD_SECONDS: f32 = 0.12;

/// Held controls plus the pointer drag accumulated since the last frame.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    /// `None` holds until released; `Some(t)` expires after `t` seconds.
    held: HashMap<Control, Option<f32>>,
    drag: f32,
}

impl InputState {
    pub fn press(&mut self, control: Control) {
        self.held.insert(control, None);
    }

    pub fn release(&mut self, control: Control) {
        self.held.remove(&control);
    }

    /// Holds `control` briefly, extending an earlier tap.
    pub fn tap(&mut self, control: Control) {
        let entry = self.held.entry(control).or_insert(Some(0.0));
        if let Some(remaining) = entry {
            *remaining = TAP_HOLD_SECONDS;
        }
    }

    pub fn drag(&mut self, dx: f32) {
        self.drag += dx;
    }

    pub fn is_held(&self, control: Control) -> bool {
        self.held.contains_key(&control)
    }

    fn axis(&self, positive: Control, negative: Control) -> f32 {
        let pos = if self.is_held(positive) { 1.0 } else { 0.0 };
        let neg = if self.is_held(negative) { 1.0 } else { 0.0 };
        pos - neg
    }

    pub fn forward(&self) -> f32 {
        self.axis(Control::Forward, Control::Back)
    }

    pub fn strafe(&self) -> f32 {
        self.axis(Control::StrafeRight, Control::StrafeLeft)
    }

    pub fn turn(&self) -> f32 {
        self.axis(Control::TurnRight, Control::TurnLeft)
    }

    pub fn take_drag(&mut self) -> f32 {
        std::mem::take(&mut self.drag)
    }

    /// Ages taps; call once per frame after movement has read the state.
    pub fn advance(&mut self, dt: f32) {
        self.held.retain(|_, remaining| match remaining {
            Some(t) => {
                *t -= dt;
                *t > 0.0
            }
            None => true,
        });
    }

    pub fn clear(&mut self) {
        self.held.clear();
        self.drag = 0.0;
    }
}
