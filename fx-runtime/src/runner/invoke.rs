//! # Invoke 模块
//!
//! 单次效果回调的调用边界。
//!
//! 回调返回的错误和回调中的 panic 都在这里被捕获、记录并转换为
//! [`EffectOutcome`]，不会传播到 Deck 的导航流程。

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::error;

use crate::element::ElementHandle;
use crate::event::Direction;
use crate::log::EffectOutcome;
use crate::registry::EffectBinding;

/// 按方向调用绑定的回调
pub fn invoke(
    binding: &EffectBinding,
    direction: Direction,
    element: &ElementHandle,
    catch_panics: bool,
) -> EffectOutcome {
    let call = || match direction {
        Direction::Forward => binding.show(element),
        Direction::Backward => binding.hide(element),
    };

    let result = if catch_panics {
        match panic::catch_unwind(AssertUnwindSafe(call)) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(&*payload);
                error!(
                    slide = %binding.key().slide,
                    fragment = binding.key().fragment,
                    %direction,
                    panic = %message,
                    "效果回调 panic，已隔离"
                );
                return EffectOutcome::Panicked { message };
            }
        }
    } else {
        call()
    };

    match result {
        Ok(()) => EffectOutcome::Applied,
        Err(e) => {
            error!(
                slide = %binding.key().slide,
                fragment = binding.key().fragment,
                %direction,
                error = %e,
                "效果回调失败"
            );
            EffectOutcome::Failed {
                message: e.to_string(),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "未知 panic".to_string()
    }
}
