mod instrument_info;
mod lock_token;
