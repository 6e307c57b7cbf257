mod password;
mod token;

pub use password::{
    hash_password, validate_password_strength, verify_password, PasswordService,
};
pub use token::{
    digest_token, generate_numeric_code, generate_pending_handle, generate_secret,
    hash_token_secret, verify_token_secret, TokenPair, ACCESS_TOKEN_LENGTH,
    PENDING_HANDLE_LENGTH, REFRESH_TOKEN_LENGTH, TWO_FACTOR_CODE_DIGITS,
};
