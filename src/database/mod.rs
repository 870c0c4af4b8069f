// 数据库模块
// 实体定义和存储库操作，所有查询都按参数绑定，条目查询一律带属主条件

pub mod models;
pub mod repositories;

pub use models::item::ItemEntity;
pub use models::user::UserEntity;
pub use repositories::item::ItemRepository;
pub use repositories::user::UserRepository;
