//! Display loop phases
//!
//! Each tick walks Draining -> (Faulting ->) Presenting -> Draining.
//! There is no terminal phase.

/// Where the loop is within a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Looking for a result to render
    #[default]
    Draining,
    /// No result; re-requesting and drawing the fault line
    Faulting,
    /// Sending the framebuffer to the panel
    Presenting,
}

/// Things that move the loop between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseEvent {
    /// A reading was taken from the result queue and rendered
    ResultRendered,
    /// The result queue was empty
    QueueEmpty,
    /// The request was re-issued and the fault line drawn
    FaultShown,
    /// The framebuffer was handed to the transport
    Presented,
}

impl Phase {
    /// Process an event and return the next phase
    ///
    /// Events that don't apply to the current phase leave it unchanged.
    pub fn transition(self, event: PhaseEvent) -> Self {
        use Phase::*;
        use PhaseEvent::*;

        match (self, event) {
            (Draining, ResultRendered) => Presenting,
            (Draining, QueueEmpty) => Faulting,
            (Faulting, FaultShown) => Presenting,
            (Presenting, Presented) => Draining,
            (phase, _) => phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_cycle() {
        let phase = Phase::default();
        assert_eq!(phase, Phase::Draining);

        let phase = phase.transition(PhaseEvent::ResultRendered);
        assert_eq!(phase, Phase::Presenting);
        assert_eq!(phase.transition(PhaseEvent::Presented), Phase::Draining);
    }

    #[test]
    fn test_fault_cycle() {
        let phase = Phase::Draining
            .transition(PhaseEvent::QueueEmpty)
            .transition(PhaseEvent::FaultShown);
        assert_eq!(phase, Phase::Presenting);
        assert_eq!(phase.transition(PhaseEvent::Presented), Phase::Draining);
    }

    #[test]
    fn test_invalid_events_ignored() {
        assert_eq!(Phase::Draining.transition(PhaseEvent::Presented), Phase::Draining);
        assert_eq!(Phase::Faulting.transition(PhaseEvent::ResultRendered), Phase::Faulting);
        assert_eq!(Phase::Presenting.transition(PhaseEvent::QueueEmpty), Phase::Presenting);
    }
}
