/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

use store_client::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DistributedLockError {
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Lock {0} is held by another owner")]
    LockContention(String),

    #[error("Lock {0} does not exist or is owned by another holder")]
    LockOwnership(String),

    #[error("Parameter error: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DistributedLockError>;
