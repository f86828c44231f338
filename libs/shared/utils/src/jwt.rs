use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use shared_models::auth::{JwtClaims, User};

/// Validate a Supabase-issued HS256 bearer token and turn its claims
/// into the request-scoped `User`.
pub fn validate_token(token: &str, secret: &str) -> Result<User, String> {
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| format!("Invalid token: {}", e))?;

    let claims = token_data.claims;
    Ok(User {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
        created_at: None,
    })
}
