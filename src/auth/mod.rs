/// Authentication module
///
/// Token encoding, pair generation and pairing checks, refresh token
/// digests, and the login/refresh use cases built on top of them.

mod claims;
mod jwt;
mod pair;
mod refresh_token;
mod rotation;

pub use claims::Claims;
pub use claims::TokenKind;
pub use jwt::TokenCodec;
pub use pair::ensure_pair;
pub use pair::PairGenerator;
pub use pair::TokenPair;
pub use refresh_token::TokenDigest;
pub use rotation::TokenService;
