#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStyle {
    Flat,
    Perspective,
}

impl RenderStyle {
    pub fn label(self) -> &'static str {
        match self {
            Self::Flat => "2D",
            Self::Perspective => "3D",
        }
    }
}

/// The four orthogonal view toggles shared by the orchestrator and both
/// renderers. An explicitly-owned value holder passed by reference, so tests
/// get an isolated instance; setters are synchronous and last-write-wins.
/// Nothing is persisted across runs.
#[derive(Clone, Copy, Debug)]
pub struct ViewState {
    render_style: RenderStyle,
    auto_rotate: bool,
    show_reverse_links: bool,
    show_flow_particles: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            render_style: RenderStyle::Perspective,
            auto_rotate: false,
            show_reverse_links: false,
            show_flow_particles: true,
        }
    }
}

impl ViewState {
    pub fn render_style(&self) -> RenderStyle {
        self.render_style
    }

    pub fn set_render_style(&mut self, style: RenderStyle) {
        self.render_style = style;
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    pub fn show_reverse_links(&self) -> bool {
        self.show_reverse_links
    }

    pub fn set_show_reverse_links(&mut self, enabled: bool) {
        self.show_reverse_links = enabled;
    }

    pub fn show_flow_particles(&self) -> bool {
        self.show_flow_particles
    }

    pub fn set_show_flow_particles(&mut self, enabled: bool) {
        self.show_flow_particles = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_perspective_with_particles() {
        let state = ViewState::default();
        assert_eq!(state.render_style(), RenderStyle::Perspective);
        assert!(!state.auto_rotate());
        assert!(!state.show_reverse_links());
        assert!(state.show_flow_particles());
    }

    #[test]
    fn setters_are_immediately_observable() {
        let mut state = ViewState::default();

        state.set_render_style(RenderStyle::Flat);
        assert_eq!(state.render_style(), RenderStyle::Flat);

        state.set_auto_rotate(true);
        assert!(state.auto_rotate());

        state.set_show_reverse_links(true);
        assert!(state.show_reverse_links());

        state.set_show_flow_particles(false);
        assert!(!state.show_flow_particles());
    }
}
