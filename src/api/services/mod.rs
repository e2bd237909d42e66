pub mod generate;
pub mod helpers;
pub mod redirect;

pub use generate::{GenerateService, generate_routes};
pub use redirect::{RedirectService, redirect_routes};

/// 注册全部路由
pub fn app_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(generate_routes()).service(redirect_routes());
}
