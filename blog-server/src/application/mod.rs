pub mod blog_manager;
