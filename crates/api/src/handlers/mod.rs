pub mod work_items;
