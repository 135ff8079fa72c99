use crate::module::withdrawal_job::error::AppError;
use crate::module::withdrawal_job::schema::CreateWithdrawalJobRequest;

pub fn validate_create_request(req: &CreateWithdrawalJobRequest) -> Result<(), AppError> {
    if req.asset_type.trim().is_empty() {
        return Err(AppError::bad_request(
            "INVALID_ASSET_TYPE",
            "asset_type is required",
        ));
    }
    if req.amount == 0 {
        return Err(AppError::bad_request(
            "INVALID_AMOUNT",
            "amount must be a positive integer in the asset's smallest unit",
        ));
    }
    if req.recipient_address.trim().is_empty() {
        return Err(AppError::bad_request(
            "INVALID_RECIPIENT_ADDRESS",
            "recipient_address is required",
        ));
    }
    if req.owner_address.trim().is_empty() {
        return Err(AppError::bad_request(
            "INVALID_OWNER_ADDRESS",
            "owner_address is required",
        ));
    }

    if !is_well_formed_address(&req.recipient_address) {
        return Err(AppError::bad_request(
            "INVALID_RECIPIENT_ADDRESS",
            "recipient_address is not a base58 public key",
        ));
    }
    if !is_well_formed_address(&req.owner_address) {
        return Err(AppError::bad_request(
            "INVALID_OWNER_ADDRESS",
            "owner_address is not a base58 public key",
        ));
    }
    if let Some(mint) = &req.mint_address {
        if !mint.trim().is_empty() && !is_well_formed_address(mint) {
            return Err(AppError::bad_request(
                "INVALID_MINT_ADDRESS",
                "mint_address is not a base58 public key",
            ));
        }
    }

    // a private withdrawal with no spendable notes is meaningless
    if req.notes.is_empty() {
        return Err(AppError::bad_request(
            "EMPTY_NOTE_SET",
            "at least one spendable note reference is required",
        ));
    }

    Ok(())
}

fn is_well_formed_address(value: &str) -> bool {
    (32..=44).contains(&value.len()) && value.chars().all(is_base58_char)
}

fn is_base58_char(c: char) -> bool {
    c.is_ascii_alphanumeric() && !matches!(c, '0' | 'O' | 'I' | 'l')
}
