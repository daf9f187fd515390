pub mod expected_response;
pub mod letter_chain;

pub use expected_response::{ExpectedMessage, ExpectedResponse};
pub use letter_chain::{ChainShape, LetterChain};
