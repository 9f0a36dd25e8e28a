mod work_item_repo;

pub use work_item_repo::PgWorkItemRepo;
