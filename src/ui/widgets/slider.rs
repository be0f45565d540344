use thiserror::Error;

/// Errors raised while validating a slider configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SliderError {
    #[error("invalid slider range: min {min} must be below max {max}")]
    InvalidRange { min: f64, max: f64 },
}

/// Axis the slider moves along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Top is max, bottom is min
    #[default]
    Vertical,
    /// Left is min, right is max
    Horizontal,
}

/// Identifies the pointer driving a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerId {
    Mouse(u8),
    Touch(u64),
}

/// A pointer sample along the slider's axis.
///
/// `position` is the global screen coordinate, used for deltas so a drag
/// keeps tracking after it leaves the widget. `offset` is the coordinate
/// relative to the widget's top (vertical) or left (horizontal) edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub id: PointerId,
    pub position: f64,
    pub offset: f64,
}

impl Pointer {
    pub fn new(id: PointerId, position: f64, offset: f64) -> Self {
        Self { id, position, offset }
    }
}

/// Typed slider configuration, validated at construction
#[derive(Debug, Clone, PartialEq)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub open_min: bool,
    pub open_max: bool,
    /// Initial value; `None` means `min`
    pub value: Option<f64>,
    pub immediate: bool,
    pub orientation: Orientation,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            open_min: false,
            open_max: false,
            value: None,
            immediate: false,
            orientation: Orientation::Vertical,
        }
    }
}

impl SliderConfig {
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Leave both bounds unenforced
    pub fn open(mut self) -> Self {
        self.open_min = true;
        self.open_max = true;
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn validate(&self) -> Result<(), SliderError> {
        validate_range(self.min, self.max)
    }
}

fn validate_range(min: f64, max: f64) -> Result<(), SliderError> {
    if !min.is_finite() || !max.is_finite() || min >= max {
        return Err(SliderError::InvalidRange { min, max });
    }
    Ok(())
}

/// A change notification carrying the new value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Change {
    pub value: f64,
}

/// Inputs the slider reacts to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderInput {
    Press(Pointer),
    Move(Pointer),
    Release(PointerId),
    /// Keyboard adjustment by a value delta
    Nudge(f64),
    /// Externally dispatched message; accepted and ignored
    Message,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging {
        pointer: PointerId,
        last_pos: f64,
        click_value: f64,
        moved: bool,
    },
}

/// Drag-to-set range control.
///
/// Change notifications are gated by `immediate`: an immediate slider
/// reports every value set during a drag, a non-immediate one reports only
/// when a gesture is committed on release.
#[derive(Debug, Clone)]
pub struct Slider {
    min: f64,
    max: f64,
    open_min: bool,
    open_max: bool,
    immediate: bool,
    orientation: Orientation,
    value: f64,
    /// Length of the widget along its axis, in pointer units
    extent: f64,
    state: DragState,
}

impl Slider {
    pub fn new(config: SliderConfig) -> Result<Self, SliderError> {
        config.validate()?;
        let mut slider = Self {
            min: config.min,
            max: config.max,
            open_min: config.open_min,
            open_max: config.open_max,
            immediate: config.immediate,
            orientation: config.orientation,
            value: config.min,
            extent: 1.0,
            state: DragState::Idle,
        };
        let initial = config.value.unwrap_or(config.min);
        slider.value = slider.constrain(initial);
        Ok(slider)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_immediate(&self) -> bool {
        self.immediate
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_sliding(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Abandon a gesture whose release will never arrive. Returns whether one
    /// was in progress. Nothing is fired.
    pub fn cancel(&mut self) -> bool {
        let was_sliding = self.is_sliding();
        self.state = DragState::Idle;
        was_sliding
    }

    /// Set the widget's length along its axis
    pub fn set_extent(&mut self, extent: f64) {
        if extent > 0.0 {
            self.extent = extent;
        }
    }

    /// Value clamped to `[min, max]`, regardless of open bounds
    pub fn clamped(&self) -> f64 {
        self.value.clamp(self.min, self.max)
    }

    /// Position of the clamped value as a fraction of the extent
    pub fn fraction(&self) -> f64 {
        (self.clamped() - self.min) / (self.max - self.min)
    }

    fn constrain(&self, mut v: f64) -> f64 {
        if v < self.min && !self.open_min {
            v = self.min;
        }
        if v > self.max && !self.open_max {
            v = self.max;
        }
        v
    }

    pub fn set_value(&mut self, v: f64, is_immediate: bool) -> Option<Change> {
        let v = self.constrain(v);
        if self.value == v {
            return None;
        }
        self.value = v;
        self.fire(is_immediate)
    }

    pub fn slide_by(&mut self, delta: f64) -> Option<Change> {
        self.set_value(self.value + delta, true)
    }

    /// Report the current value if `is_immediate` matches the slider's mode
    pub fn fire(&self, is_immediate: bool) -> Option<Change> {
        (is_immediate == self.immediate).then_some(Change { value: self.value })
    }

    /// Rebind to a new range and value; the notification is discarded
    pub fn reconfigure(&mut self, min: f64, max: f64, value: f64) -> Result<(), SliderError> {
        validate_range(min, max)?;
        self.min = min;
        self.max = max;
        self.state = DragState::Idle;
        let _ = self.set_value(value, true);
        // The stored value may sit outside the new range when it was unchanged
        self.value = self.constrain(self.value);
        Ok(())
    }

    fn scale(&self) -> f64 {
        (self.max - self.min) / self.extent
    }

    /// Convert a pointer movement into a value delta
    pub fn decode_delta(&self, delta: f64) -> f64 {
        match self.orientation {
            Orientation::Vertical => -delta * self.scale(),
            Orientation::Horizontal => delta * self.scale(),
        }
    }

    /// Value under a point measured from the widget's top or left edge
    pub fn decode_value(&self, offset: f64) -> f64 {
        match self.orientation {
            Orientation::Vertical => self.min + (self.extent - offset) * self.scale(),
            Orientation::Horizontal => self.min + offset * self.scale(),
        }
    }

    pub fn handle(&mut self, input: SliderInput) -> Option<Change> {
        match input {
            SliderInput::Press(pointer) => {
                self.press(pointer);
                None
            }
            SliderInput::Move(pointer) => self.drag(pointer),
            SliderInput::Release(id) => self.release(id),
            SliderInput::Nudge(delta) => {
                if self.is_sliding() {
                    return None;
                }
                self.slide_by(delta).or(self.fire(false))
            }
            SliderInput::Message => None,
        }
    }

    fn press(&mut self, pointer: Pointer) {
        if self.is_sliding() {
            return;
        }
        self.state = DragState::Dragging {
            pointer: pointer.id,
            last_pos: pointer.position,
            click_value: self.decode_value(pointer.offset),
            moved: false,
        };
    }

    fn drag(&mut self, pointer: Pointer) -> Option<Change> {
        let DragState::Dragging { pointer: active, last_pos, click_value, moved } = self.state else {
            return None;
        };
        if active != pointer.id {
            return None;
        }
        let dv = self.decode_delta(pointer.position - last_pos);
        let mut change = None;
        let mut moved = moved;
        if dv != 0.0 {
            moved = true;
            change = self.slide_by(dv);
        }
        self.state = DragState::Dragging {
            pointer: active,
            last_pos: pointer.position,
            click_value,
            moved,
        };
        change
    }

    fn release(&mut self, id: PointerId) -> Option<Change> {
        let DragState::Dragging { pointer, click_value, moved, .. } = self.state else {
            return None;
        };
        if pointer != id {
            return None;
        }
        self.state = DragState::Idle;
        let tap = if moved { None } else { self.set_value(click_value, true) };
        // Release always commits
        tap.or(self.fire(false))
    }
}
