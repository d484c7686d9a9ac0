/*! Thompson's construction.

Every automaton built or returned by the functions in this module is a
*fragment*: it has exactly one accepting state, and that state has no
outgoing transitions. The combinators rely on this to find the end of their
operands and preserve it for their results, so fragments compose freely.

```
use scanner_fa::Automaton;

// (ab)*
let fa = Automaton::from_char(b'a')
    .concat(&Automaton::from_char(b'b'))
    .close();

assert_eq!(fa.n_states(), 7);
assert_eq!(fa.accepting().len(), 1);
```
*/

use crate::bitset::BitSet128;
use crate::fa::{Automaton, StateId, EPSILON};

impl Automaton {
    /// Returns a fragment that matches `byte`: state 1 goes to state 2 on
    /// `byte`, state 1 is initial and state 2 is accepting.
    ///
    /// # Panics
    ///
    /// If `byte` is [`EPSILON`], which can't be matched.
    pub fn from_char(byte: u8) -> Self {
        assert_ne!(byte, EPSILON, "NUL is reserved for epsilon transitions");
        Self::edge(|fa| fa.add_transition(1, byte, 2))
    }

    /// Returns a fragment that matches the empty string.
    pub fn epsilon() -> Self {
        Self::edge(|fa| fa.add_transition(1, EPSILON, 2))
    }

    /// Returns a fragment that matches any single byte of `bytes`. It has
    /// two states, like [`Automaton::from_char`], and one transition per
    /// byte.
    ///
    /// # Panics
    ///
    /// If `bytes` contains [`EPSILON`].
    pub fn from_bytes(bytes: BitSet128) -> Self {
        assert!(
            !bytes.contains(EPSILON),
            "NUL is reserved for epsilon transitions"
        );
        Self::edge(|fa| {
            for byte in bytes {
                fa.add_transition(1, byte, 2);
            }
        })
    }

    /// Appends `next` to this fragment: the result matches what this
    /// fragment matches followed by what `next` matches.
    ///
    /// The accepting state of `self` is linked to the initial state of
    /// `next` with an epsilon transition.
    pub fn concat(mut self, next: &Automaton) -> Self {
        let end = self.final_state();
        let next_end = next.final_state();

        self.set_accepting(end, false);
        let bias = self.merge(next);
        self.add_transition(end, EPSILON, next.initial_state() + bias);

        debug_assert!(self.is_accepting(next_end + bias));
        self
    }

    /// Returns a fragment that matches either this fragment or `other`.
    ///
    /// Two states are added: a new initial state with epsilon transitions
    /// to both initial states, and a new accepting state reached from both
    /// former accepting states through epsilon transitions.
    pub fn alternate(mut self, other: &Automaton) -> Self {
        let (init, end) = (self.initial_state(), self.final_state());
        let bias = self.merge(other);
        let (other_init, other_end) =
            (other.initial_state() + bias, other.final_state() + bias);

        self.set_accepting(end, false);
        self.set_accepting(other_end, false);

        let new_init = self.add_states(2);
        let new_end = new_init + 1;

        self.add_transition(new_init, EPSILON, init);
        self.add_transition(new_init, EPSILON, other_init);
        self.add_transition(end, EPSILON, new_end);
        self.add_transition(other_end, EPSILON, new_end);

        self.set_initial_state(new_init);
        self.set_accepting(new_end, true);
        self
    }

    /// Kleene star: returns a fragment that matches this fragment zero or
    /// more times.
    pub fn close(mut self) -> Self {
        let (init, end) = (self.initial_state(), self.final_state());
        self.set_accepting(end, false);

        let new_init = self.add_states(2);
        let new_end = new_init + 1;

        self.add_transition(new_init, EPSILON, init);
        self.add_transition(new_init, EPSILON, new_end);
        self.add_transition(end, EPSILON, init);
        self.add_transition(end, EPSILON, new_end);

        self.set_initial_state(new_init);
        self.set_accepting(new_end, true);
        self
    }

    /// Builds a two state fragment and lets `link` add the transitions
    /// from state 1 to state 2.
    fn edge(link: impl FnOnce(&mut Automaton)) -> Self {
        let mut fa = Automaton::new();
        let init = fa.add_states(2);
        link(&mut fa);
        fa.set_initial_state(init);
        fa.set_accepting(init + 1, true);
        fa
    }

    /// The single accepting state of a fragment.
    fn final_state(&self) -> StateId {
        let accepting = self.accepting();
        debug_assert_eq!(
            accepting.len(),
            1,
            "a fragment must have exactly one accepting state"
        );
        match accepting.smallest() {
            Some(state) => state as StateId,
            None => panic!("a fragment must have an accepting state"),
        }
    }
}
