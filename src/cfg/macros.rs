//! 由配置构造组件的辅助宏

/// 为配置类型实现 `From<Config> for Type`，内部调用 `Type::new(config)`
///
/// 用法：`impl_from!(TextFormatterConfig => TextFormatter)`
#[macro_export]
macro_rules! impl_from {
    ($config_type:ty => $target_type:ty) => {
        impl From<$config_type> for $target_type {
            fn from(config: $config_type) -> Self {
                <$target_type>::new(config)
            }
        }
    };
}

/// 为 `Box<T>` 实现到 `Box<dyn Trait>` 的转换
///
/// 用法：`impl_box_from!(TextFormatter => dyn LogFormatter)`
#[macro_export]
macro_rules! impl_box_from {
    ($source_type:ty => dyn $trait_name:path) => {
        impl From<Box<$source_type>> for Box<dyn $trait_name> {
            fn from(source: Box<$source_type>) -> Self {
                source as Box<dyn $trait_name>
            }
        }
    };
}
