pub mod auth_dto;

pub use auth_dto::{
    AuthResponseDto, LoginRequestDto, MeResponseDto, RefreshTokenRequestDto,
    RefreshTokenResponseDto, RegisterRequestDto,
};
