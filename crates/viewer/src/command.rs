use std::fmt;

use crate::generator::{Generator, Variant};
use crate::state::ViewerState;

/// Discrete reconfiguration requests issued from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Select(Variant),
    ToggleRender,
    IncreaseOrder,
    DecreaseOrder,
}

impl Command {
    /// Key bindings: `q` quits, `1`/`2`/`3` pick a variant, space toggles
    /// rendering, `+`/`-` adjust the order.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'q' => Some(Command::Quit),
            '1' => Some(Command::Select(Variant::Serial)),
            '2' => Some(Command::Select(Variant::ParallelCpu)),
            '3' => Some(Command::Select(Variant::ParallelGpu)),
            ' ' => Some(Command::ToggleRender),
            '+' => Some(Command::IncreaseOrder),
            '-' => Some(Command::DecreaseOrder),
            _ => None,
        }
    }
}

/// State change produced by a command, rendered as the status line shown
/// to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandEffect {
    Exit,
    Selected(Variant),
    Rendering(bool),
    OrderIncreased(u32),
    OrderDecreased(u32),
    OrderRejected,
}

impl fmt::Display for CommandEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandEffect::Exit => f.write_str("Closing application"),
            CommandEffect::Selected(variant) => write!(f, "Selected {variant} implementation"),
            CommandEffect::Rendering(true) => f.write_str("Rendering enabled"),
            CommandEffect::Rendering(false) => f.write_str("Rendering disabled"),
            CommandEffect::OrderIncreased(order) => write!(f, "Increased order to {order}"),
            CommandEffect::OrderDecreased(order) => write!(f, "Decreased order to {order}"),
            CommandEffect::OrderRejected => f.write_str("Cannot set order to zero"),
        }
    }
}

/// Applies a command to the shared state. Exiting the loop is left to the
/// caller.
pub(crate) fn apply<G: Generator>(state: &mut ViewerState<'_, G>, command: Command) -> CommandEffect {
    match command {
        Command::Quit => CommandEffect::Exit,
        Command::Select(variant) => {
            state.generator.set_name(variant.label());
            state.generator.set_variant(variant);
            CommandEffect::Selected(variant)
        }
        Command::ToggleRender => {
            state.rendering_enabled = !state.rendering_enabled;
            CommandEffect::Rendering(state.rendering_enabled)
        }
        Command::IncreaseOrder => {
            let order = state.generator.order().saturating_add(1);
            state.generator.set_order(order);
            CommandEffect::OrderIncreased(order)
        }
        Command::DecreaseOrder => match state.generator.order().checked_sub(1) {
            Some(order) if order >= 1 => {
                state.generator.set_order(order);
                CommandEffect::OrderDecreased(order)
            }
            _ => CommandEffect::OrderRejected,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::generator::GeneratorError;

    struct Stub {
        name: &'static str,
        variant: Variant,
        order: u32,
    }

    impl Generator for Stub {
        fn width(&self) -> u32 {
            4
        }
        fn height(&self) -> u32 {
            4
        }
        fn name(&self) -> &str {
            self.name
        }
        fn set_name(&mut self, name: &'static str) {
            self.name = name;
        }
        fn variant(&self) -> Variant {
            self.variant
        }
        fn set_variant(&mut self, variant: Variant) {
            self.variant = variant;
        }
        fn order(&self) -> u32 {
            self.order
        }
        fn set_order(&mut self, order: u32) {
            self.order = order;
        }
        fn recompute_bounds(&mut self) -> Result<(), GeneratorError> {
            Ok(())
        }
        fn generate(&mut self) -> Result<(), GeneratorError> {
            Ok(())
        }
        fn buffer(&self) -> &[u8] {
            &[]
        }
    }

    fn stub(order: u32) -> Stub {
        Stub {
            name: "serial",
            variant: Variant::Serial,
            order,
        }
    }

    #[test]
    fn key_bindings_cover_every_command() {
        assert_eq!(Command::from_key('q'), Some(Command::Quit));
        assert_eq!(
            Command::from_key('3'),
            Some(Command::Select(Variant::ParallelGpu))
        );
        assert_eq!(Command::from_key(' '), Some(Command::ToggleRender));
        assert_eq!(Command::from_key('-'), Some(Command::DecreaseOrder));
        assert_eq!(Command::from_key('x'), None);
        assert_eq!(Command::from_key('Q'), None);
    }

    #[test]
    fn decrease_at_floor_is_rejected_without_side_effects() {
        let mut generator = stub(1);
        let mut state = ViewerState::new(&mut generator, Instant::now()).expect("state");
        let effect = apply(&mut state, Command::DecreaseOrder);
        assert_eq!(effect, CommandEffect::OrderRejected);
        assert_eq!(state.generator().order(), 1);
        assert!(state.rendering_enabled());
        assert_eq!(state.generator().name(), "serial");
    }

    #[test]
    fn order_never_drops_below_one() {
        let mut generator = stub(2);
        let mut state = ViewerState::new(&mut generator, Instant::now()).expect("state");
        let script = [
            Command::DecreaseOrder,
            Command::IncreaseOrder,
            Command::DecreaseOrder,
            Command::DecreaseOrder,
            Command::DecreaseOrder,
            Command::IncreaseOrder,
            Command::IncreaseOrder,
            Command::DecreaseOrder,
        ];
        for command in script {
            apply(&mut state, command);
            assert!(state.generator().order() >= 1);
        }
        assert_eq!(state.generator().order(), 2);
    }

    #[test]
    fn toggle_render_is_its_own_inverse() {
        let mut generator = stub(3);
        let mut state = ViewerState::new(&mut generator, Instant::now()).expect("state");
        assert_eq!(
            apply(&mut state, Command::ToggleRender),
            CommandEffect::Rendering(false)
        );
        assert_eq!(
            apply(&mut state, Command::ToggleRender),
            CommandEffect::Rendering(true)
        );
        assert!(state.rendering_enabled());
    }

    #[test]
    fn select_updates_name_and_variant() {
        let mut generator = stub(3);
        let mut state = ViewerState::new(&mut generator, Instant::now()).expect("state");
        for variant in Variant::ALL {
            apply(&mut state, Command::Select(variant));
            assert_eq!(state.generator().variant(), variant);
            assert_eq!(state.generator().name(), variant.label());
        }
    }

    #[test]
    fn status_lines_match_effects() {
        assert_eq!(
            CommandEffect::Selected(Variant::ParallelCpu).to_string(),
            "Selected openmp implementation"
        );
        assert_eq!(
            CommandEffect::OrderIncreased(4).to_string(),
            "Increased order to 4"
        );
        assert_eq!(CommandEffect::Rendering(false).to_string(), "Rendering disabled");
    }
}
