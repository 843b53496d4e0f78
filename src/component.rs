//! Defines the Component trait, used by each stage that sits between the
//! position provider and the presentation layer. Each stage consumes data
//! from the preceding stage, processes it, and passes new data on over a
//! channel.

use log::{info, warn};
use std::fmt::{self, Display};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Returned by [`Component::finalize`] when a stage shuts down in a state
/// worth reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// The input closed while a route to this destination was still active.
    StillNavigating(String),
}

impl Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentError::StillNavigating(destination) => {
                write!(f, "input closed while navigating to {}", destination)
            }
        }
    }
}

impl std::error::Error for ComponentError {}

///
/// A stage in the navigation pipeline. Anything that turns one kind of
/// message into another on its own thread implements Component, so that it
/// can be wired up with [`run_component`].
///
pub trait Component: ToString {
    type InData;
    type OutData;

    /// Converts an input of type A into an output of type B
    fn convert(&mut self, input: Self::InData) -> Self::OutData;

    /// Cleans up at termination of pipeline
    fn finalize(&mut self) -> Result<(), ComponentError>;
}

/// Runs the given Component on its own thread. On receiving data of type
/// InData on the input channel, the Component converts them to data of type
/// OutData and sends it to the output channel. The thread ends, and hands
/// the component back, once the input channel closes.
pub fn run_component<C: Component + Send + 'static>(
    mut component: Box<C>,
    input: Receiver<<C as Component>::InData>,
    output: Sender<<C as Component>::OutData>,
) -> JoinHandle<Box<C>>
where
    <C as Component>::InData: Send + 'static,
    <C as Component>::OutData: Send + 'static,
{
    thread::spawn(move || {
        while let Ok(data) = input.recv() {
            let out_data = component.convert(data);
            if let Err(error) = output.send(out_data) {
                warn!("{} : received error {}.", component.to_string(), error);
            }
        }

        if let Err(component_error) = component.finalize() {
            warn!(
                "{} : error during terminating : {component_error}.",
                component.to_string(),
            );
        }
        info!("{} : terminated.", component.to_string());
        component
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    /// Counts what passes through it
    struct MockComponent {
        seen: usize,
    }

    impl MockComponent {
        fn new() -> Self {
            Self { seen: 0 }
        }
    }

    impl Component for MockComponent {
        type InData = i32;
        type OutData = i32;

        fn convert(&mut self, input: i32) -> i32 {
            self.seen += 1;
            input + 1
        }

        fn finalize(&mut self) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    impl Display for MockComponent {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "MockComponent")
        }
    }

    /// Writing a value to the Component's input produces that value,
    /// converted, on its output
    #[test]
    fn test_mock_component() {
        let mock_comp = MockComponent::new();
        let (test_tx, block_rx) = channel::<i32>();
        let (block_tx, test_rx) = channel::<i32>();

        let handle = run_component(Box::new(mock_comp), block_rx, block_tx);

        assert_eq!(test_tx.send(0), Ok(()));
        assert_eq!(test_rx.recv(), Ok(1));

        drop(test_tx);
        let comp = handle.join().unwrap();
        assert_eq!(comp.seen, 1);
    }

    #[test]
    fn test_chained_component() {
        let mock_comp_a = MockComponent::new();
        let mock_comp_b = MockComponent::new();

        let (test_tx, block_a_rx) = channel::<i32>();
        let (block_a_tx, block_b_rx) = channel::<i32>();
        let (block_b_tx, test_rx) = channel::<i32>();

        run_component(Box::new(mock_comp_a), block_a_rx, block_a_tx);

        run_component(Box::new(mock_comp_b), block_b_rx, block_b_tx);

        assert_eq!(test_tx.send(0), Ok(()));
        assert_eq!(test_rx.recv(), Ok(2));
    }
}
